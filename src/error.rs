//! Error types for the produce_grading library

use thiserror::Error;

/// Result type alias for produce_grading operations
pub type Result<T> = std::result::Result<T, GradingError>;

/// Error types for grading operations
///
/// The infallible entry points on [`crate::QualityGrader`] never surface these;
/// they degrade to `"unknown"` / neutral defaults instead. The `try_*` variants
/// and [`crate::AnalysisReport`] expose them so failure causes stay inspectable.
#[derive(Error, Debug)]
pub enum GradingError {
    /// Region has no pixels
    #[error("Region is empty ({width}x{height})")]
    EmptyRegion { width: u32, height: u32 },

    /// Category string is not part of the product registry
    #[error("Unsupported product category: {0}")]
    UnsupportedCategory(String),

    /// Category is registered but the rule table has no rule set for it
    #[error("No color rule set for category: {0}")]
    MissingRuleSet(String),

    /// Raw pixel buffer does not match the declared dimensions
    #[error("Invalid region buffer: expected {expected} bytes for {width}x{height}, got {actual}")]
    InvalidRegion {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration parsed but violates a table invariant
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl GradingError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this error only degrades a single result field
    ///
    /// Recoverable errors are the ones the grader absorbs per region; the rest
    /// are setup problems the caller has to fix.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GradingError::EmptyRegion { .. }
                | GradingError::UnsupportedCategory(_)
                | GradingError::MissingRuleSet(_)
                | GradingError::InvalidParameter { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            GradingError::EmptyRegion { .. } => {
                "The detected region is empty and could not be graded.".to_string()
            }
            GradingError::UnsupportedCategory(category) => {
                format!("'{}' is not a supported product for quality grading.", category)
            }
            GradingError::MissingRuleSet(category) => {
                format!("No color rules are configured for '{}'.", category)
            }
            GradingError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            GradingError::ConfigError { .. } | GradingError::InvalidConfig { .. } => {
                "The grading configuration is invalid. Please check the configuration file.".to_string()
            }
            _ => "Quality grading failed for this region.".to_string(),
        }
    }
}
