//! Error taxonomy for the prediction engine

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The raw record could not be normalized or aligned
    #[error("Malformed record field '{field}': {reason}")]
    MalformedRecord { field: String, reason: String },

    /// A schema or estimator artifact is missing, corrupt or inconsistent
    #[error("Failed to load model artifact {path:?}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// An estimator failed while scoring a feature vector
    #[error("Inference failed{}: {reason}", estimator_label(.estimator))]
    Inference {
        estimator: Option<String>,
        reason: String,
    },
}

fn estimator_label(estimator: &Option<String>) -> String {
    match estimator {
        Some(name) => format!(" in estimator '{}'", name),
        None => String::new(),
    }
}

impl EngineError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn model_load(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl Into<String>) -> Self {
        Self::Inference {
            estimator: None,
            reason: reason.into(),
        }
    }

    /// Tag an inference failure with the estimator that produced it
    pub fn for_estimator(self, name: &str) -> Self {
        match self {
            Self::Inference { reason, .. } => Self::Inference {
                estimator: Some(name.to_string()),
                reason,
            },
            other => other,
        }
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::ModelLoad { .. } => "model_load",
            Self::Inference { .. } => "inference",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
