//! Search-interest ("hype") reduction

use chrono::{Duration, NaiveDate};

/// Length of the pre-release window the interest series is sampled over
pub const HYPE_WINDOW_DAYS: i64 = 45;

/// Peak and mean search interest over the pre-release window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HypeSummary {
    pub peak: f64,
    pub average: f64,
}

impl HypeSummary {
    /// Reduce a series to its max and mean; an empty series reads as no hype
    pub fn from_series(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self::default();
        }
        let peak = finite.iter().copied().fold(f64::MIN, f64::max);
        let average = finite.iter().sum::<f64>() / finite.len() as f64;
        Self { peak, average }
    }
}

/// Inclusive date range queried for search interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HypeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HypeWindow {
    /// The 45 days that end the day before release
    pub fn before_release(release: NaiveDate) -> Self {
        Self {
            start: release - Duration::days(HYPE_WINDOW_DAYS),
            end: release - Duration::days(1),
        }
    }

    /// Window for a `YYYY-MM-DD` release date; `None` when it does not parse
    pub fn from_release_date(release_date: &str) -> Option<Self> {
        NaiveDate::parse_from_str(release_date.trim(), "%Y-%m-%d")
            .ok()
            .map(Self::before_release)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Provider timeframe string, `YYYY-MM-DD YYYY-MM-DD`
    pub fn timeframe(&self) -> String {
        format!("{} {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_series() {
        let summary = HypeSummary::from_series(&[10.0, 50.0, 30.0]);
        assert_eq!(summary.peak, 50.0);
        assert_eq!(summary.average, 30.0);
    }

    #[test]
    fn test_empty_series_is_zero() {
        assert_eq!(HypeSummary::from_series(&[]), HypeSummary::default());
        assert_eq!(HypeSummary::from_series(&[f64::NAN]), HypeSummary::default());
    }

    #[test]
    fn test_window_before_release() {
        let release = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = HypeWindow::before_release(release);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(window.timeframe(), "2024-01-16 2024-02-29");
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(release));
    }

    #[test]
    fn test_window_from_release_date_string() {
        let window = HypeWindow::from_release_date("1995-12-15").unwrap();
        assert_eq!(window.end, NaiveDate::from_ymd_opt(1995, 12, 14).unwrap());
        assert_eq!(HypeWindow::from_release_date(""), None);
        assert_eq!(HypeWindow::from_release_date("December 1995"), None);
    }
}
