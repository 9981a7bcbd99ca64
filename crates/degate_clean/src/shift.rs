//! Shift-register chain tracing, alignment and decoding.
//!
//! A chain is a run of registers where each one loads the previous one,
//! possibly through an inverter, under the same clock, enable and resets.
//! The reset values along such a chain are often a constant that was
//! shifted in, so they are collected as a bit sequence and offered as
//! candidate ASCII text.

use crate::error::CleanError;
use crate::pass::{Pass, PassContext};
use degate_common::{DegateResult, Logic};
use degate_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use degate_expr::Expr;
use degate_netlist::Netlist;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Which way a chain is followed from its starting register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainDirection {
    /// Towards the register that loads the current one.
    Downstream,
    /// Towards the register the current one loads from.
    Upstream,
}

/// Why a chain walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceStop {
    /// The next register has a different clock, enable or reset.
    Mismatch,
    /// The next register was already visited.
    Cycle,
    /// No unique next register exists.
    ChainEnd,
}

impl fmt::Display for TraceStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceStop::Mismatch => write!(f, "control mismatch"),
            TraceStop::Cycle => write!(f, "cycle"),
            TraceStop::ChainEnd => write!(f, "end of chain"),
        }
    }
}

/// The result of walking one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTrace {
    /// The register the walk started from.
    pub start: String,
    /// Direction of the walk.
    pub direction: ChainDirection,
    /// Reset value of every visited register, in visiting order.
    pub bits: Vec<Logic>,
    /// Visited registers, starting with `start`.
    pub visited: Vec<String>,
    /// Registers whose polarity was flipped to align the chain.
    pub inverted: Vec<String>,
    /// Why the walk ended.
    pub stop: TraceStop,
}

/// One reading of a chain's bits as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedText {
    /// Bits were complemented before packing.
    pub inverted: bool,
    /// Bit order within each byte was reversed before packing.
    pub reversed: bool,
    /// The packed bytes as text.
    pub text: String,
    /// `text` read back to front.
    pub backwards: String,
}

impl ShiftTrace {
    /// The bits as a `0`/`1`/`x` string.
    pub fn bit_string(&self) -> String {
        self.bits.iter().map(ToString::to_string).collect()
    }

    /// All four `(inverted, reversed)` readings of the bits.
    ///
    /// This is a guess: nothing in the structure tells which reading, or
    /// which direction, is the intended one.
    pub fn decode(&self) -> Vec<DecodedText> {
        let mut readings = Vec::with_capacity(4);
        for inverted in [false, true] {
            for reversed in [false, true] {
                let text = decode_bits(&self.bits, inverted, reversed);
                let backwards = text.chars().rev().collect();
                readings.push(DecodedText {
                    inverted,
                    reversed,
                    text,
                    backwards,
                });
            }
        }
        readings
    }
}

/// Packs `bits` into bytes, eight at a time with the first bit as the least
/// significant, and keeps the bytes that are ASCII.
///
/// A trailing partial byte is dropped and `x` bits count as `0`.
pub fn decode_bits(bits: &[Logic], inverted: bool, reversed: bool) -> String {
    bits.chunks_exact(8)
        .filter_map(|group| {
            let ordered: Vec<Logic> = if reversed {
                group.iter().rev().copied().collect()
            } else {
                group.to_vec()
            };
            let byte = ordered.iter().enumerate().fold(0u8, |byte, (i, &bit)| {
                let bit = if inverted { !bit } else { bit };
                if bit == Logic::One {
                    byte | 1 << i
                } else {
                    byte
                }
            });
            byte.is_ascii().then_some(char::from(byte))
        })
        .collect()
}

/// Follows the chain downstream from `start` without changing anything.
///
/// Returns `None` if `start` is not a register.
pub fn trace_chain(netlist: &mut Netlist, start: &str) -> DegateResult<Option<ShiftTrace>> {
    walk(netlist, start, ChainDirection::Downstream)
}

/// Follows the chain upstream from `start`, inverting every register that
/// is reached through a negation so the whole chain shifts with one
/// polarity.
///
/// Returns `None` if `start` is not a register.
pub fn align_chain(netlist: &mut Netlist, start: &str) -> DegateResult<Option<ShiftTrace>> {
    walk(netlist, start, ChainDirection::Upstream)
}

fn walk(netlist: &mut Netlist, start: &str, direction: ChainDirection) -> DegateResult<Option<ShiftTrace>> {
    let Some(origin) = netlist.find_clocked(start).cloned() else {
        return Ok(None);
    };
    let mut trace = ShiftTrace {
        start: start.to_string(),
        direction,
        bits: vec![origin.reset_value],
        visited: vec![origin.dest.clone()],
        inverted: Vec::new(),
        stop: TraceStop::ChainEnd,
    };

    let mut current = origin.dest.clone();
    loop {
        let Some((next, negated)) = next_link(netlist, &current, direction) else {
            trace.stop = TraceStop::ChainEnd;
            break;
        };
        let candidate = &netlist.clocked[next];
        if !candidate.same_control(&origin) {
            trace.stop = TraceStop::Mismatch;
            break;
        }
        if trace.visited.contains(&candidate.dest) {
            trace.stop = TraceStop::Cycle;
            break;
        }
        let dest = candidate.dest.clone();
        if negated && direction == ChainDirection::Upstream {
            if netlist.invert_register(&dest)? {
                trace.inverted.push(dest.clone());
            } else {
                debug!(net = %dest, "register drives a port or clock, left negated");
            }
        }
        trace.bits.push(netlist.clocked[next].reset_value);
        trace.visited.push(dest.clone());
        current = dest;
    }
    Ok(Some(trace))
}

/// Index of the next register after `dest` and whether the link between
/// them goes through an odd number of negations.
fn next_link(netlist: &Netlist, dest: &str, direction: ChainDirection) -> Option<(usize, bool)> {
    match direction {
        ChainDirection::Downstream => {
            let index = netlist.loader_index(dest)?;
            Some((index, netlist.clocked[index].value.as_not().is_some()))
        }
        ChainDirection::Upstream => {
            let (source, negated) = strip_negations(&netlist.find_clocked(dest)?.value);
            let index = netlist.clocked_index(source.as_net()?)?;
            Some((index, negated))
        }
    }
}

fn strip_negations(mut expr: &Expr) -> (&Expr, bool) {
    let mut negated = false;
    while let Some(inner) = expr.as_not() {
        expr = inner;
        negated = !negated;
    }
    (expr, negated)
}

/// Emits the chain summary and, when at least one byte was recovered, the
/// four decoded readings.
pub fn report_trace(sink: &DiagnosticSink, trace: &ShiftTrace) {
    let mut summary = Diagnostic::note(
        DiagnosticCode::SHIFT_CHAIN,
        format!(
            "shift chain from `{}`: {} registers, stopped at {}",
            trace.start,
            trace.visited.len(),
            trace.stop
        ),
    )
    .with_note(format!("bits: {}", trace.bit_string()));
    if !trace.inverted.is_empty() {
        summary = summary.with_note(format!("inverted: {}", trace.inverted.join(", ")));
    }
    sink.emit(summary);

    if trace.bits.len() < 8 {
        return;
    }
    for reading in trace.decode() {
        sink.emit(Diagnostic::note(
            DiagnosticCode::SHIFT_DECODE,
            format!(
                "`{}` inverted={} reversed={}: {:?} {:?}",
                trace.start,
                u8::from(reading.inverted),
                u8::from(reading.reversed),
                reading.text,
                reading.backwards
            ),
        ));
    }
}

/// Traces the `trace_shifts` chains.
pub struct TraceShiftsPass;

impl Pass for TraceShiftsPass {
    fn name(&self) -> &'static str {
        "trace_shifts"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        for start in &ctx.rules.trace_shifts {
            let Some(trace) = trace_chain(netlist, start)? else {
                debug!(net = %start, "no register to trace from");
                continue;
            };
            info!(start = %start, length = trace.visited.len(), stop = %trace.stop, "traced shift chain");
            report_trace(ctx.sink, &trace);
            ctx.report.traces.push(trace);
        }
        Ok(0)
    }
}

/// Traces and aligns the `align_shifts` chains.
pub struct AlignShiftsPass;

impl Pass for AlignShiftsPass {
    fn name(&self) -> &'static str {
        "align_shifts"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut inverted = 0;
        for start in &ctx.rules.align_shifts {
            let Some(trace) = align_chain(netlist, start)? else {
                debug!(net = %start, "no register to align from");
                continue;
            };
            info!(start = %start, length = trace.visited.len(), stop = %trace.stop, "aligned shift chain");
            inverted += trace.inverted.len();
            report_trace(ctx.sink, &trace);
            ctx.report.traces.push(trace);
        }
        Ok(inverted)
    }
}
