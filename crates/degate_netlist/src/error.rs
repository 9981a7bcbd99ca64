//! Error types for circuit graph construction.

use degate_expr::ExprParseError;

/// Errors raised while building a [`Netlist`](crate::Netlist).
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// A clocked element was defined for a destination with no declared
    /// initial value.
    #[error("register '{0}' has no declared initial value")]
    MissingInitialValue(String),

    /// Definition text did not parse as an expression.
    #[error("invalid expression for '{net}': {source}")]
    InvalidExpression {
        /// The net being defined.
        net: String,
        /// The underlying parse failure.
        source: ExprParseError,
    },
}
