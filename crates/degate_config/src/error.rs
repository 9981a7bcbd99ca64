//! Error types for rule loading and validation.

/// Errors that can occur when loading or validating a rule file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the rule file.
    #[error("failed to read rules: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML or JSON content could not be parsed.
    #[error("failed to parse rules: {0}")]
    ParseError(String),

    /// A rule value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
