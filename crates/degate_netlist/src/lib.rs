//! The mutable circuit graph recovered from a flattened netlist.
//!
//! A [`Netlist`] holds the module's ports, one combinational definition per
//! net, the clocked storage elements and presentation-only bundles. The
//! cleanup passes mutate it in place; [`emit_verilog`] serializes it.
//!
//! Collections preserve insertion order, so the printed output depends only
//! on the input and the rules.

#![warn(missing_docs)]

pub mod clocked;
pub mod emit;
pub mod error;
pub mod graph;
pub mod netlist;

pub use clocked::ClockedDef;
pub use emit::emit_verilog;
pub use error::NetlistError;
pub use netlist::Netlist;
