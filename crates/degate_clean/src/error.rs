//! Error types for the cleanup pipeline.

use degate_common::InternalError;
use degate_config::ConfigError;

/// Errors that abort a cleanup run.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// The rule set asks for something the passes cannot do.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pass violated a netlist invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_transparent() {
        let err: CleanError = ConfigError::ValidationError("reset 'r' has polarity '1'".into()).into();
        assert_eq!(format!("{err}"), "validation error: reset 'r' has polarity '1'");
    }

    #[test]
    fn internal_error_is_transparent() {
        let err: CleanError = InternalError::new("combinational loop through 'x'").into();
        assert_eq!(format!("{err}"), "internal error: combinational loop through 'x'");
    }
}
