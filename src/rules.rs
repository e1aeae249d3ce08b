//! Rule set assembly: built-in baseline rules plus project overrides.
//!
//! Project rules live in `.revet/rules/*.toml` and are loaded after the
//! baseline. A project rule with the same (category, pattern) key as a
//! baseline rule shadows it: only the project rule's findings survive.
//! Malformed rule files and uncompilable patterns degrade to warnings;
//! the run proceeds with whatever parsed.

use crate::models::change::FileCategory;
use crate::models::rulefile::{RuleFile, RuleSpec};
use crate::models::{Category, Severity};
use regex::Regex;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    Baseline,
    Project,
}

#[derive(Debug, Clone)]
/// A compiled, ready-to-match rule.
pub struct Rule {
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub pattern: String,
    pub regex: Regex,
    pub message: String,
    pub suggestion: Option<String>,
    /// Buckets the rule applies to; empty means all.
    pub applies_to: Vec<FileCategory>,
    /// Restrict matches to diff-touched lines; `None` follows the config default.
    pub changed_only: Option<bool>,
    pub source: RuleSource,
}

/// Shadow key: a project rule replaces a baseline rule sharing this key.
pub fn shadow_key(rule: &Rule) -> (Category, String) {
    (rule.category, rule.pattern.clone())
}

fn parse_bucket(tok: &str) -> Option<FileCategory> {
    match tok {
        "implementation" => Some(FileCategory::Implementation),
        "test" => Some(FileCategory::Test),
        "documentation" => Some(FileCategory::Documentation),
        "configuration" => Some(FileCategory::Configuration),
        _ => None,
    }
}

/// Compile one authored rule. An unrecognized category demotes the rule
/// to suggestion severity rather than dropping it.
fn compile_spec(spec: &RuleSpec, source: RuleSource, warnings: &mut Vec<String>) -> Option<Rule> {
    let regex = match Regex::new(&spec.pattern) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!(
                "rule '{}' skipped: invalid pattern: {}",
                spec.id, e
            ));
            return None;
        }
    };
    let severity = if spec.category == Category::Unknown {
        Severity::Suggestion
    } else {
        spec.severity.unwrap_or(Severity::Suggestion)
    };
    let mut applies_to = Vec::new();
    for tok in &spec.applies_to {
        match parse_bucket(tok) {
            Some(b) => applies_to.push(b),
            None => warnings.push(format!(
                "rule '{}': unknown applies_to bucket '{}' ignored",
                spec.id, tok
            )),
        }
    }
    Some(Rule {
        id: spec.id.clone(),
        category: spec.category,
        severity,
        pattern: spec.pattern.clone(),
        regex,
        message: spec.message.clone(),
        suggestion: spec.suggestion.clone(),
        applies_to,
        changed_only: spec.changed_only,
        source,
    })
}

struct Builtin {
    id: &'static str,
    category: Category,
    severity: Severity,
    pattern: &'static str,
    message: &'static str,
    suggestion: Option<&'static str>,
    applies_to: &'static [FileCategory],
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        id: "secret-literal",
        category: Category::Security,
        severity: Severity::Critical,
        pattern: r#"(?i)(api[_-]?key|secret|password|token)\s*[:=]\s*"[^"]{4,}""#,
        message: "Possible hardcoded credential",
        suggestion: Some("Load secrets from the environment or a secret store"),
        applies_to: &[FileCategory::Implementation, FileCategory::Configuration],
    },
    Builtin {
        id: "aws-access-key",
        category: Category::Security,
        severity: Severity::Critical,
        pattern: r"AKIA[0-9A-Z]{16}",
        message: "AWS access key id committed to the repository",
        suggestion: Some("Revoke the key and load credentials from the environment"),
        applies_to: &[],
    },
    Builtin {
        id: "unwrap-call",
        category: Category::ErrorHandling,
        severity: Severity::Warning,
        pattern: r"\.unwrap\(\)",
        message: "unwrap() panics on the error path",
        suggestion: Some("Propagate with `?` or handle the None/Err case"),
        applies_to: &[FileCategory::Implementation],
    },
    Builtin {
        id: "expect-call",
        category: Category::ErrorHandling,
        severity: Severity::Warning,
        pattern: r"\.expect\(",
        message: "expect() panics on the error path",
        suggestion: Some("Propagate with `?` or handle the None/Err case"),
        applies_to: &[FileCategory::Implementation],
    },
    Builtin {
        id: "panic-call",
        category: Category::ErrorHandling,
        severity: Severity::Warning,
        pattern: r"panic!\(",
        message: "Explicit panic in library/binary code",
        suggestion: Some("Return an error instead of panicking"),
        applies_to: &[FileCategory::Implementation],
    },
    Builtin {
        id: "todo-comment",
        category: Category::Style,
        severity: Severity::Suggestion,
        pattern: r"(?i)\b(todo|fixme)\b",
        message: "Leftover TODO/FIXME marker",
        suggestion: None,
        applies_to: &[],
    },
    Builtin {
        id: "debug-print",
        category: Category::Style,
        severity: Severity::Suggestion,
        pattern: r"\b(dbg!|println!)\(",
        message: "Debug print left in code",
        suggestion: Some("Remove it or route through the project's output layer"),
        applies_to: &[FileCategory::Implementation],
    },
    Builtin {
        id: "double-clone",
        category: Category::Performance,
        severity: Severity::Suggestion,
        pattern: r"\.clone\(\)\.clone\(\)",
        message: "Redundant double clone",
        suggestion: Some("Drop the second clone()"),
        applies_to: &[FileCategory::Implementation],
    },
];

/// The built-in baseline rule set.
pub fn baseline() -> Vec<Rule> {
    BUILTINS
        .iter()
        .map(|b| Rule {
            id: b.id.to_string(),
            category: b.category,
            severity: b.severity,
            pattern: b.pattern.to_string(),
            // Builtin patterns are covered by tests; a failure here is a
            // programming error, not an input error.
            regex: Regex::new(b.pattern).expect("builtin rule pattern"),
            message: b.message.to_string(),
            suggestion: b.suggestion.map(str::to_string),
            applies_to: b.applies_to.to_vec(),
            changed_only: None,
            source: RuleSource::Baseline,
        })
        .collect()
}

/// Load project rules from every `*.toml` under `dir`, in file-name order.
///
/// A file that fails to read or parse contributes a warning and nothing
/// else; rules from other files still load.
pub fn load_project_rules(dir: &Path) -> (Vec<Rule>, Vec<String>) {
    let mut rules = Vec::new();
    let mut warnings = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        // No rules dir at all is the common case, not a degradation.
        Err(_) => return (rules, warnings),
    };
    let mut paths: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "toml").unwrap_or(false))
        .collect();
    paths.sort();
    for path in paths {
        let name = crate::utils::rel_to_wd(&path);
        let src = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                warnings.push(format!("rule file '{}' unreadable: {}", name, e));
                continue;
            }
        };
        let file: RuleFile = match toml::from_str(&src) {
            Ok(f) => f,
            Err(e) => {
                warnings.push(format!("rule file '{}' skipped: {}", name, e));
                continue;
            }
        };
        for spec in &file.rules {
            if let Some(rule) = compile_spec(spec, RuleSource::Project, &mut warnings) {
                rules.push(rule);
            }
        }
    }
    (rules, warnings)
}

/// Merge baseline and project rules with override semantics: group by
/// (category, pattern), prefer the later (project) source.
pub fn resolve(baseline: Vec<Rule>, project: Vec<Rule>) -> Vec<Rule> {
    let shadowed: Vec<(Category, String)> = project.iter().map(shadow_key).collect();
    let mut out: Vec<Rule> = baseline
        .into_iter()
        .filter(|r| !shadowed.contains(&shadow_key(r)))
        .collect();
    out.extend(project);
    out
}

/// Assemble the effective rule set for a run.
pub fn effective_rules(rules_dir: &Path) -> (Vec<Rule>, Vec<String>) {
    let (project, warnings) = load_project_rules(rules_dir);
    (resolve(baseline(), project), warnings)
}
