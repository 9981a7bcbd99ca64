//! Cleanup pipeline for imported gate-level netlists.
//!
//! Every transformation is a [`Pass`] over a [`Netlist`](degate_netlist::Netlist):
//! the clean cycle (wire forwarding, normalization, dead-net removal), the
//! rule-driven passes (renames, extra outputs, polarity inversion, bundles),
//! reset recovery, adder recovery and shift-chain alignment. [`Pipeline`]
//! strings them into the three stages and snapshots the printed module
//! after each one.

#![warn(missing_docs)]

pub mod carry;
pub mod clean;
pub mod error;
pub mod pass;
pub mod pipeline;
pub mod reset;
pub mod rules;
pub mod shift;

pub use error::CleanError;
pub use pass::{run_passes, Pass, PassContext};
pub use pipeline::{Pipeline, Snapshot, StageReport};
pub use shift::{decode_bits, ChainDirection, DecodedText, ShiftTrace, TraceStop};
