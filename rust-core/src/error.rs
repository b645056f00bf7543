//! Error types for the segmentation engine.
//!
//! Every stage is a deterministic pure function, so errors are never retried
//! or recovered internally: they indicate bad input or bad configuration and
//! are surfaced to the caller immediately.

/// Common result type for segmentation operations.
pub type Result<T> = std::result::Result<T, GaitError>;

/// Unified error type for the segmentation engine.
#[derive(Debug, thiserror::Error)]
pub enum GaitError {
    /// Input data violates a structural invariant (e.g. time going backwards).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A component was configured with values it cannot run with.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Underlying file or stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular export failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered to TOML.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl GaitError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        GaitError::Validation(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        GaitError::Configuration(msg.into())
    }

    /// True for errors caused by the input data rather than the setup.
    pub fn is_validation(&self) -> bool {
        matches!(self, GaitError::Validation(_))
    }

    /// True for errors caused by component configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GaitError::Configuration(_))
    }
}
