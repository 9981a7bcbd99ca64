//! Rule file loading and validation.

use crate::error::ConfigError;
use crate::types::{RuleSet, ACTIVE_LOW};
use std::path::Path;

/// The serialization format of a rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    /// JSON, as in `cleanup_renames.json`.
    Json,
    /// TOML.
    Toml,
}

impl RuleFormat {
    /// Picks the format from a file extension: `.json` is JSON, anything else TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RuleFormat::Json,
            _ => RuleFormat::Toml,
        }
    }
}

/// Loads and validates a rule file.
pub fn load_rules(path: &Path) -> Result<RuleSet, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_rules_from_str(&content, RuleFormat::from_path(path))
}

/// Parses and validates rules from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_rules_from_str(content: &str, format: RuleFormat) -> Result<RuleSet, ConfigError> {
    let rules: RuleSet = match format {
        RuleFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        }
        RuleFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        }
    };
    validate_rules(&rules)?;
    Ok(rules)
}

/// Checks that every reset is active low.
pub fn validate_rules(rules: &RuleSet) -> Result<(), ConfigError> {
    for (reset, polarity) in &rules.resets {
        if polarity != ACTIVE_LOW {
            return Err(ConfigError::ValidationError(format!(
                "reset '{reset}' has polarity '{polarity}', only active-low ('0') resets are supported"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_json_rules() {
        let json = r#"{
            "rename": {"n12": "clk_en"},
            "resets": {"rst_n": "0"},
            "invert_ff": ["q3"],
            "trace_shifts": ["sr0"],
            "align_shifts": ["sr7"],
            "output": ["flag"],
            "bundle_wires": {"key": ["k0", "k1", "k2"]}
        }"#;
        let rules = load_rules_from_str(json, RuleFormat::Json).unwrap();
        assert_eq!(rules.rename["n12"], "clk_en");
        assert_eq!(rules.resets["rst_n"], "0");
        assert_eq!(rules.invert_ff, vec!["q3"]);
        assert_eq!(rules.bundle_wires["key"].len(), 3);
    }

    #[test]
    fn parse_toml_rules() {
        let toml = r#"
invert_ff = ["q1", "q2"]
output = ["led"]

[rename]
n5 = "button"

[resets]
rst = "0"

[bundle_wires]
bus = ["b0", "b1"]
"#;
        let rules = load_rules_from_str(toml, RuleFormat::Toml).unwrap();
        assert_eq!(rules.invert_ff, vec!["q1", "q2"]);
        assert_eq!(rules.rename["n5"], "button");
        assert_eq!(rules.bundle_wires["bus"], vec!["b0", "b1"]);
    }

    #[test]
    fn reject_active_high_reset() {
        let err = load_rules_from_str(r#"{"resets": {"rst": "1"}}"#, RuleFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(format!("{err}").contains("rst"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = load_rules_from_str("{ not json", RuleFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(RuleFormat::from_path(Path::new("rules.json")), RuleFormat::Json);
        assert_eq!(RuleFormat::from_path(Path::new("rules.JSON")), RuleFormat::Json);
        assert_eq!(RuleFormat::from_path(Path::new("rules.toml")), RuleFormat::Toml);
        assert_eq!(RuleFormat::from_path(Path::new("rules")), RuleFormat::Toml);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"output": ["y"]}}"#).unwrap();
        let rules = load_rules(file.path()).unwrap();
        assert_eq!(rules.output, vec!["y"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rules(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
