//! Rule file schema: `[[rules]]` tables loaded from `.revet/rules/*.toml`.

use crate::models::{Category, Severity};
use serde::Deserialize;

#[derive(Deserialize)]
/// Top-level rule file: zero or more `[[rules]]` entries.
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Deserialize, Clone)]
/// A single rule entry as authored in TOML.
pub struct RuleSpec {
    pub id: String,
    pub category: Category,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Regex applied line-by-line to file content at the head revision.
    pub pattern: String,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    /// File buckets the rule applies to; empty means all.
    #[serde(default)]
    pub applies_to: Vec<String>,
    /// Restrict matches to lines the diff touched.
    #[serde(default)]
    pub changed_only: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_file_parses_with_defaults() {
        let src = r#"
[[rules]]
id = "no-dbg"
category = "style"
pattern = "dbg!\\("
message = "Remove dbg! before merging"

[[rules]]
id = "sql-concat"
category = "security"
severity = "critical"
pattern = "format!\\(.*(SELECT|INSERT|UPDATE|DELETE)"
message = "Possible SQL built by string formatting"
suggestion = "Use parameterized queries"
applies_to = ["implementation"]
changed_only = true
"#;
        let rf: RuleFile = toml::from_str(src).unwrap();
        assert_eq!(rf.rules.len(), 2);
        assert_eq!(rf.rules[0].severity, None);
        assert!(rf.rules[0].applies_to.is_empty());
        assert_eq!(rf.rules[1].severity, Some(Severity::Critical));
        assert_eq!(rf.rules[1].changed_only, Some(true));
        assert_eq!(rf.rules[1].category, Category::Security);
    }

    #[test]
    fn test_unknown_category_is_preserved_not_rejected() {
        let src = r#"
[[rules]]
id = "odd"
category = "made-up"
pattern = "x"
message = "m"
"#;
        let rf: RuleFile = toml::from_str(src).unwrap();
        assert_eq!(rf.rules[0].category, Category::Unknown);
    }
}
