//! Single-bit logic constants with an unknown state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single-bit constant value.
///
/// `X` is the value of a register declared without an initializer. It is
/// carried through the pipeline untouched: no rewrite rule fires on it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', and 'x'/'X'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            _ => None,
        }
    }

    /// Converts a boolean to `Zero`/`One`.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Returns the boolean value, or `None` for `X`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logic::Zero => Some(false),
            Logic::One => Some(true),
            Logic::X => None,
        }
    }

    /// Returns `true` for `Zero` and `One`.
    pub fn is_known(self) -> bool {
        self != Logic::X
    }

    /// Parses a Verilog literal denoting a single bit.
    ///
    /// Accepts plain `0`/`1` and sized or unsized based literals such as
    /// `1'b0`, `1'bx`, `'h1`, `4'd1`. Returns `None` for anything wider than
    /// one bit and for high-impedance values.
    pub fn from_literal(text: &str) -> Option<Self> {
        let Some((size, rest)) = text.split_once('\'') else {
            return match text {
                "0" => Some(Logic::Zero),
                "1" => Some(Logic::One),
                _ => None,
            };
        };
        if !size.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let rest = rest.strip_prefix(['s', 'S']).unwrap_or(rest);
        let mut chars = rest.chars();
        let radix = match chars.next()? {
            'b' | 'B' => 2,
            'o' | 'O' => 8,
            'd' | 'D' => 10,
            'h' | 'H' => 16,
            _ => return None,
        };
        let digits: String = chars.filter(|c| *c != '_').collect();
        if digits.is_empty() {
            return None;
        }
        if digits.chars().all(|c| c == 'x' || c == 'X') {
            return Some(Logic::X);
        }
        match u64::from_str_radix(&digits, radix).ok()? {
            0 => Some(Logic::Zero),
            1 => Some(Logic::One),
            _ => None,
        }
    }

    /// Renders the value as a Verilog literal (`0`, `1`, `1'bx`).
    pub fn verilog(self) -> &'static str {
        match self {
            Logic::Zero => "0",
            Logic::One => "1",
            Logic::X => "1'bx",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "x"),
        }
    }
}

/// AND with `0` dominating:
/// ```text
///     0  1  X
/// 0 | 0  0  0
/// 1 | 0  1  X
/// X | 0  X  X
/// ```
impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// OR with `1` dominating:
/// ```text
///     0  1  X
/// 0 | 0  1  X
/// 1 | 1  1  1
/// X | X  1  X
/// ```
impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// XOR, unknown if either side is unknown.
impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

/// `!0 = 1`, `!1 = 0`, `!X = X`
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X => X,
        }
    }
}
