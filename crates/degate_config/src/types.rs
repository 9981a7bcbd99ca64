//! Rule set types deserialized from `cleanup_renames.json` (or TOML).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The only reset polarity the pipeline understands: active low.
pub const ACTIVE_LOW: &str = "0";

/// Rules consumed by the cleanup pipeline.
///
/// Every field is optional in the file. Maps keep the order in which
/// entries appear so that passes iterate them deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Net renames, old name to new name, applied in file order.
    pub rename: IndexMap<String, String>,
    /// Reset signals and their active polarity (`"0"` only).
    pub resets: IndexMap<String, String>,
    /// Registers whose stored polarity is flipped.
    pub invert_ff: Vec<String>,
    /// Registers from which shift chains are traced in the consumer direction.
    pub trace_shifts: Vec<String>,
    /// Registers from which shift chains are traced and sign-aligned.
    pub align_shifts: Vec<String>,
    /// Nets appended to the output port list.
    pub output: Vec<String>,
    /// Bundle name to ordered member nets.
    pub bundle_wires: IndexMap<String, Vec<String>>,
}

impl RuleSet {
    /// Returns `true` if no rule of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.rename.is_empty()
            && self.resets.is_empty()
            && self.invert_ff.is_empty()
            && self.trace_shifts.is_empty()
            && self.align_shifts.is_empty()
            && self.output.is_empty()
            && self.bundle_wires.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(RuleSet::default().is_empty());
    }

    #[test]
    fn missing_fields_default() {
        let rules: RuleSet = serde_json::from_str(r#"{"output": ["flag"]}"#).unwrap();
        assert_eq!(rules.output, vec!["flag"]);
        assert!(rules.rename.is_empty());
        assert!(!rules.is_empty());
    }

    #[test]
    fn rename_keeps_file_order() {
        let rules: RuleSet =
            serde_json::from_str(r#"{"rename": {"z": "a", "b": "c", "a": "q"}}"#).unwrap();
        let keys: Vec<&str> = rules.rename.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "b", "a"]);
    }
}
