//! Shared foundational types used across the degate netlist recovery tools.
//!
//! This crate provides the three-valued [`Logic`] constant, byte-offset
//! [`Span`]s for source locations, and the internal-error result type.

#![warn(missing_docs)]

pub mod logic;
pub mod result;
pub mod span;

pub use logic::Logic;
pub use result::{DegateResult, InternalError};
pub use span::Span;
