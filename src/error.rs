//! Error types.
//!
//! Nothing here is fatal to the engine. A [`LoadError`] is absorbed at the
//! load-cycle boundary and becomes a [`LoadStatus::Failed`](crate::pipeline::LoadStatus)
//! display state; it never reaches the disclosure controller or the reporter.

use thiserror::Error;

/// Why a deal fetch produced no usable collection.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The upstream call failed or answered with nothing.
    #[error("deal data unavailable: {reason}")]
    DataUnavailable { reason: String },

    /// The upstream answered but its business code was not 200.
    #[error("upstream rejected request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The response body was not a valid envelope.
    #[error("malformed deal response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LoadError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }
}

/// Invalid [`RevealConfig`](crate::config::RevealConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid reveal config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },
}
