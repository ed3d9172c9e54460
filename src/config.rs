//! Reveal configuration.
//!
//! Every option has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! initial-visible-count = 4
//! load-more-step = 4
//! preload-step = 2
//! preload-delay-ms = 300
//! proximity-threshold = 2
//! report-timing = "on-commit"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// When the completion reporter captures its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportTiming {
    /// As soon as the reveal window becomes non-empty.
    #[default]
    OnCommit,
    /// On the first paint commit after the window becomes non-empty.
    AfterPaint,
}

/// Tunables for one deal list instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RevealConfig {
    /// Items disclosed when a collection arrives.
    pub initial_visible_count: usize,
    /// Items added per scroll-triggered growth step.
    pub load_more_step: usize,
    /// Items added by the deferred preload after a growth step.
    pub preload_step: usize,
    /// Delay before the preload commits.
    pub preload_delay_ms: u64,
    /// Remaining disclosed items below the viewport at which growth triggers.
    pub proximity_threshold: usize,
    pub report_timing: ReportTiming,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            initial_visible_count: 4,
            load_more_step: 4,
            preload_step: 2,
            preload_delay_ms: 300,
            proximity_threshold: 2,
            report_timing: ReportTiming::OnCommit,
        }
    }
}

impl RevealConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall disclosure.
    ///
    /// A zero initial count would keep the window empty forever, so no
    /// completion report could ever fire. A zero `preload_step` is allowed
    /// and disables the preload.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_visible_count == 0 {
            return Err(ConfigError::Zero {
                field: "initial-visible-count",
            });
        }
        if self.load_more_step == 0 {
            return Err(ConfigError::Zero {
                field: "load-more-step",
            });
        }
        Ok(())
    }
}
