//! Clocked storage elements.

use degate_common::Logic;
use degate_expr::Expr;
use serde::{Deserialize, Serialize};

/// One synchronous storage element, updated on the rising edge of `clock`.
///
/// The printed process assigns `value` when `ce` holds, then `reset_value`
/// when `reset` holds, then `reset_value` when both `ce` and `ce_reset`
/// hold. Later assignments win, so resets take priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockedDef {
    /// The clock net.
    pub clock: String,
    /// Clock enable; `1` when the element loads every cycle.
    pub ce: Expr,
    /// The register driven by this element.
    pub dest: String,
    /// Next-state expression.
    pub value: Expr,
    /// Unconditional synchronous reset; `0` when absent.
    pub reset: Expr,
    /// Reset gated by the clock enable; `0` when absent.
    pub ce_reset: Expr,
    /// Value loaded by either reset.
    pub reset_value: Logic,
    /// Power-on value.
    pub init: Logic,
}

impl ClockedDef {
    /// Creates an element with no resets whose reset value is its initial value.
    pub fn new(clock: impl Into<String>, ce: Expr, dest: impl Into<String>, value: Expr, init: Logic) -> Self {
        Self {
            clock: clock.into(),
            ce,
            dest: dest.into(),
            value,
            reset: Expr::ZERO,
            ce_reset: Expr::ZERO,
            reset_value: init,
            init,
        }
    }

    /// Returns `true` if either reset is present.
    pub fn has_reset(&self) -> bool {
        !self.reset.is_const(Logic::Zero) || !self.ce_reset.is_const(Logic::Zero)
    }

    /// Returns `true` if this element is controlled exactly like `other`:
    /// same clock, enable and resets.
    pub fn same_control(&self, other: &ClockedDef) -> bool {
        self.clock == other.clock
            && self.ce == other.ce
            && self.reset == other.reset
            && self.ce_reset == other.ce_reset
    }

    /// Computes the stored value after one active clock edge.
    ///
    /// `lookup` supplies the values of every net the expressions reference,
    /// `current` is the value held before the edge.
    pub fn next_state(&self, lookup: &dyn Fn(&str) -> Logic, current: Logic) -> Logic {
        let loaded = self.value.eval(lookup);
        let mut next = guarded(self.ce.eval(lookup), loaded, current);
        next = guarded(self.reset.eval(lookup), self.reset_value, next);
        let ce_reset = self.ce.eval(lookup) & self.ce_reset.eval(lookup);
        guarded(ce_reset, self.reset_value, next)
    }
}

/// `if (cond) target <= value` applied to a target holding `held`.
fn guarded(cond: Logic, value: Logic, held: Logic) -> Logic {
    match cond {
        Logic::One => value,
        Logic::Zero => held,
        Logic::X if value == held => held,
        Logic::X => Logic::X,
    }
}
