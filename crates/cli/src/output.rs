//! Output formatting utilities

use boxoffice_lib::PredictionResult;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a rounded table, or the raw value as pretty JSON
pub fn print_rows<R: Tabled, J: Serialize + ?Sized>(rows: Vec<R>, json: &J, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                print_warning("Nothing to show");
                return Ok(());
            }
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(json)?),
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Group thousands with commas, keeping two decimals below 1000
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.abs() < 1000.0 {
        return format!("{:.2}", value);
    }

    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if value < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Color a feature value by sign; zeros are dimmed
pub fn color_value(value: f64) -> String {
    let formatted = format_amount(value);
    if value == 0.0 {
        formatted.dimmed().to_string()
    } else if value < 0.0 {
        formatted.red().to_string()
    } else {
        formatted.green().to_string()
    }
}

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Estimator")]
    estimator: String,
    #[tabled(rename = "Prediction")]
    prediction: String,
}

pub fn print_prediction(result: &PredictionResult, model_version: &str, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<PredictionRow> = match result {
        PredictionResult::Single(value) => vec![PredictionRow {
            estimator: "prediction".to_string(),
            prediction: format_amount(*value).bold().to_string(),
        }],
        PredictionResult::Named(named) => named
            .iter()
            .map(|(name, value)| PredictionRow {
                estimator: name.to_string(),
                prediction: format_amount(value).bold().to_string(),
            })
            .collect(),
    };

    match format {
        OutputFormat::Table => {
            print_rows(rows, result, format)?;
            println!("\nModel version: {}", model_version.cyan());
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "prediction": result,
                "model_version": model_version,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(2.456), "2.46");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(123456789.4), "123,456,789");
        assert_eq!(format_amount(-2500000.0), "-2,500,000");
    }
}
