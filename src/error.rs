//! Pipeline outcome errors
//!
//! Each halt condition of a run maps to exactly one variant. Callers match on
//! the variant (or its [`Severity`]) instead of parsing messages.

use serde::Serialize;
use thiserror::Error;

use crate::Ticker;

/// How a halt should be surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Instrument '{name}' is not in the catalog.")]
    LookupFailure { name: String },

    #[error("No valid closing price data found for {ticker} in this date range.")]
    DataUnavailable { ticker: Ticker },

    #[error(
        "Volatility could not be calculated ({available} clean bars, window {window}). \
         Try selecting a longer date range."
    )]
    InsufficientHistory { available: usize, window: usize },

    #[error("Error during volatility calculation: {cause}")]
    ComputationFailure { cause: String },
}

impl PipelineError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::InsufficientHistory { .. } => Severity::Warning,
            Self::LookupFailure { .. }
            | Self::DataUnavailable { .. }
            | Self::ComputationFailure { .. } => Severity::Error,
        }
    }

    pub fn computation(cause: impl Into<String>) -> Self {
        Self::ComputationFailure {
            cause: cause.into(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        let warn = PipelineError::InsufficientHistory {
            available: 5,
            window: 20,
        };
        assert_eq!(warn.severity(), Severity::Warning);

        let err = PipelineError::DataUnavailable {
            ticker: Ticker::new("TCS.NS"),
        };
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(
            PipelineError::computation("boom").severity(),
            Severity::Error
        );
    }

    #[test]
    fn test_messages_name_the_cause() {
        let err = PipelineError::computation("window must be at least 2");
        assert_eq!(
            err.to_string(),
            "Error during volatility calculation: window must be at least 2"
        );

        let err = PipelineError::LookupFailure {
            name: "ACME".to_string(),
        };
        assert!(err.to_string().contains("ACME"));
    }
}
