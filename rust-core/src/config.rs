//! Configuration Management
//!
//! Every tunable constant of the engine is a named field on one of the
//! component configs; [`AnalysisConfig`] bundles them so a whole analysis can
//! be described by one TOML file:
//!
//! ```toml
//! [batch]
//! gap_threshold = 1.0
//!
//! [stance]
//! right_entry_threshold = -1.5
//! left_entry_threshold = 2.5
//!
//! [aggregator]
//! include_unlabeled = false
//!
//! [smoother]
//! window_length = 51
//! polyorder = 3
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::batch::BatchConfig;
use crate::error::Result;
use crate::segmentation::AggregatorConfig;
use crate::signal::SmootherConfig;
use crate::stance_detection::StanceConfig;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Recording batch split
    pub batch: BatchConfig,
    /// Stance entry thresholds
    pub stance: StanceConfig,
    /// Segment table options
    pub aggregator: AggregatorConfig,
    /// Savitzky–Golay parameters
    pub smoother: SmootherConfig,
}

impl AnalysisConfig {
    /// Validate every section, failing on the first problem.
    ///
    /// The smoother's window length can only be checked against a concrete
    /// signal, so that check happens when smoothing.
    pub fn validate(&self) -> Result<()> {
        self.batch.validate()?;
        self.stance.validate()?;
        self.smoother.validate()?;
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save config to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
