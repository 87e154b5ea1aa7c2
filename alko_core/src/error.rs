//! Error types for the alko_core library.
//!
//! The engine stages never fail. These errors belong to the boundary:
//! reading records, loading configuration, and resolving drink specs.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for alko_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown preset or invalid preset catalog
    #[error("Preset error: {0}")]
    Preset(String),

    /// Malformed drink specification
    #[error("Invalid drink spec: {0}")]
    DrinkSpec(String),
}
