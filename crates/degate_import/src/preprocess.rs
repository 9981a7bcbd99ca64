//! Textual rewriting applied before parsing.
//!
//! Carry chains are marked in the source with a trailing comment such as
//! `assign c = (a & b) | ((a | b) & ci); /* CARRY chain 3 */`. Comments do
//! not survive lexing, so each such line is rewritten to start with the
//! attribute `(* CARRY *)`, which the parser keeps as a pragma item.

use degate_common::InternalError;
use regex::Regex;

/// The pragma name that marks a carry assignment.
pub const CARRY_PRAGMA: &str = "CARRY";

const CARRY_COMMENT: &str = r"(?m)^(.*)/\*\s*CARRY.+\*/";

/// Moves every `/* CARRY ... */` comment to a leading `(* CARRY *)`
/// attribute on its line. Line structure is preserved.
pub fn preprocess(source: &str) -> Result<String, InternalError> {
    let re = Regex::new(CARRY_COMMENT).map_err(|e| InternalError::new(e.to_string()))?;
    Ok(re
        .replace_all(source, format!("(* {CARRY_PRAGMA} *)$1").as_str())
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_comment_becomes_attribute() {
        let out = preprocess("  assign c = a & b; /* CARRY 7 */\n").unwrap();
        assert_eq!(out, "(* CARRY *)  assign c = a & b; \n");
    }

    #[test]
    fn other_lines_are_untouched() {
        let src = "assign x = a; /* note */\nassign y = b;\n/*CARRY*/\n";
        assert_eq!(preprocess(src).unwrap(), src);
    }

    #[test]
    fn line_count_is_preserved() {
        let src = "a /* CARRY x */\nb\nc /* CARRY y */";
        let out = preprocess(src).unwrap();
        assert_eq!(out.lines().count(), 3);
        assert_eq!(out.matches("(* CARRY *)").count(), 2);
    }
}
