//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
    /// Informational pipeline reports, prefixed with `N`.
    Note,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Note => 'N',
        }
    }
}

/// A structured diagnostic code: category prefix plus a numeric identifier.
///
/// Displayed as the prefix followed by a zero-padded 3-digit number, e.g.
/// `E101`, `W201`, `N301`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// Lexical error in the HDL source.
    pub const LEX: Self = Self::new(Category::Error, 100);
    /// Syntax error in the HDL source.
    pub const SYNTAX: Self = Self::new(Category::Error, 101);
    /// Construct the importer cannot translate.
    pub const UNSUPPORTED: Self = Self::new(Category::Error, 200);
    /// AST node kind the importer does not know; its children are still visited.
    pub const UNRECOGNIZED_NODE: Self = Self::new(Category::Warning, 201);
    /// Reference to a net that is neither input, register, nor combinational.
    pub const UNDECLARED_NET: Self = Self::new(Category::Warning, 202);
    /// Rule file missing; the run continues with an empty rule set.
    pub const MISSING_RULES: Self = Self::new(Category::Warning, 203);
    /// Shift-register chain trace summary.
    pub const SHIFT_CHAIN: Self = Self::new(Category::Note, 301);
    /// Candidate text decoded from a shift-register chain.
    pub const SHIFT_DECODE: Self = Self::new(Category::Note, 302);
    /// Carry/sum pair recognised as a full adder.
    pub const FULL_ADDER: Self = Self::new(Category::Note, 303);
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
