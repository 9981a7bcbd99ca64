//! Error types for netlist import.

use degate_common::{InternalError, Span};
use degate_netlist::NetlistError;

/// Fatal problems that stop an import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The source had lexing or parsing errors; they are in the diagnostic sink.
    #[error("source has {0} syntax error(s)")]
    Syntax(usize),

    /// The source contains no module.
    #[error("no module found in source")]
    NoModule,

    /// A construct the importer cannot translate.
    #[error("unsupported construct: {construct}")]
    Unsupported {
        /// What was found, e.g. `negedge clock`.
        construct: String,
        /// Where it was found.
        span: Span,
    },

    /// Building the circuit graph failed.
    #[error(transparent)]
    Netlist(#[from] NetlistError),

    /// An invariant of the importer itself was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl ImportError {
    pub(crate) fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        ImportError::Unsupported {
            construct: construct.into(),
            span,
        }
    }

    /// The source location the error points at, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ImportError::Unsupported { span, .. } => Some(*span),
            _ => None,
        }
    }
}
