//! Loading and validation of cleanup rule files.
//!
//! A rule file parameterizes the cleanup pipeline: which nets to rename,
//! which signals are resets, which registers to invert, which shift chains
//! to trace, extra outputs and bus bundles. It is read once per run and is
//! read-only afterwards.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_rules, load_rules_from_str, validate_rules, RuleFormat};
pub use types::*;
