//! Error types for the styling engine

use thiserror::Error;

/// Result type alias for styler configuration and query operations
pub type Result<T> = std::result::Result<T, StylerError>;

/// Errors raised at the configuration and query boundary.
///
/// Styling itself never fails: unmatched tags, disabled features and empty
/// queries all resolve to "nothing highlighted".
#[derive(Error, Debug)]
pub enum StylerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Setting `{key}` must be {expected}")]
    InvalidSetting { key: String, expected: &'static str },
}
