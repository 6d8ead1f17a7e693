//! Error types for the overlay engine

use thiserror::Error;

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Overlay error types
///
/// Classification never produces one of these. Only host configuration
/// problems (themes, config files) and I/O surface as errors.
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required style token: {token}")]
    MissingStyleToken { token: String },

    #[error("Invalid value for style token {token}: {value:?}")]
    InvalidStyleToken { token: String, value: String },

    #[error("Theme parse error: {0}")]
    ThemeParse(#[from] toml::de::Error),

    #[error("{0}")]
    Message(String),
}
