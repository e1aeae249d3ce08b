//! Rule Evaluator: applies the rule set to every changed file's full
//! content at the pinned revision.
//!
//! Per-file work is independent and runs on rayon; the combined findings
//! are sorted by (file, line, severity) so a re-run against the same
//! revision is order-stable.

use crate::diffmap;
use crate::error::RevetError;
use crate::extract;
use crate::models::change::ChangeDescriptor;
use crate::models::{Category, Finding, ReviewResult, Severity, SkippedFile};
use crate::rules::Rule;
use crate::score::{self, Weights};
use rayon::prelude::*;
use std::path::Path;

/// Read access to file content at one pinned revision.
///
/// The evaluator never settles for the diff's context lines: a rule may
/// need to see code outside the changed hunks, so full content is loaded.
pub trait RevisionSource: Sync {
    fn read_file(&self, path: &str) -> Result<String, String>;
}

/// Production source: `git show <revision>:<path>`.
pub struct GitSource<'a> {
    pub root: &'a Path,
    pub revision: &'a str,
}

impl RevisionSource for GitSource<'_> {
    fn read_file(&self, path: &str) -> Result<String, String> {
        let spec = format!("{}:{}", self.revision, path);
        extract::git(self.root, &["show", &spec]).map_err(|e| match e {
            RevetError::NotFound(m) | RevetError::Git(m) => m,
            other => other.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
/// Per-run evaluation knobs resolved from config + CLI.
pub struct EvalOptions {
    /// Enabled categories; empty means all.
    pub focus: Vec<Category>,
    /// Glob restricting which changed files are evaluated.
    pub file_filter: Option<String>,
    /// Default for rules that do not set `changed_only` themselves.
    pub changed_only_default: bool,
    pub weights: Weights,
}

fn rule_enabled(rule: &Rule, focus: &[Category]) -> bool {
    focus.is_empty() || focus.contains(&rule.category)
}

/// Evaluate the rule set against the descriptor.
///
/// Unreadable files become `skipped_files` entries; evaluation continues
/// for the rest. Nothing here mutates the descriptor.
pub fn evaluate(
    descriptor: &ChangeDescriptor,
    rules: &[Rule],
    opts: &EvalOptions,
    source: &dyn RevisionSource,
) -> ReviewResult {
    let changed = diffmap::changed_lines(&descriptor.diff);
    let filter = opts
        .file_filter
        .as_deref()
        .and_then(|g| glob::Pattern::new(g).ok());
    let enabled: Vec<&Rule> = rules.iter().filter(|r| rule_enabled(r, &opts.focus)).collect();

    let targets: Vec<_> = descriptor
        .files
        .iter()
        .filter(|f| {
            filter
                .as_ref()
                .map(|p| p.matches(&f.path))
                .unwrap_or(true)
        })
        .collect();

    let per_file: Vec<(Vec<Finding>, Option<SkippedFile>)> = targets
        .par_iter()
        .map(|fc| {
            let content = match source.read_file(&fc.path) {
                Ok(s) => s,
                Err(reason) => {
                    return (
                        Vec::new(),
                        Some(SkippedFile {
                            file: fc.path.clone(),
                            reason,
                        }),
                    )
                }
            };
            let touched = changed.get(&fc.path);
            let mut findings = Vec::new();
            for (idx, line) in content.lines().enumerate() {
                let lineno = idx + 1;
                for rule in &enabled {
                    if !rule.applies_to.is_empty() && !rule.applies_to.contains(&fc.category) {
                        continue;
                    }
                    let scoped = rule.changed_only.unwrap_or(opts.changed_only_default);
                    if scoped && !touched.map(|t| t.contains(&lineno)).unwrap_or(false) {
                        continue;
                    }
                    if rule.regex.is_match(line) {
                        findings.push(Finding {
                            file: fc.path.clone(),
                            line: lineno,
                            severity: rule.severity,
                            category: rule.category,
                            message: rule.message.clone(),
                            snippet: line.trim().to_string(),
                            suggestion: rule.suggestion.clone(),
                            rule: rule.id.clone(),
                        });
                    }
                }
            }
            (findings, None)
        })
        .collect();

    let mut findings: Vec<Finding> = Vec::new();
    let mut skipped_files: Vec<SkippedFile> = Vec::new();
    for (f, s) in per_file {
        findings.extend(f);
        skipped_files.extend(s);
    }
    findings.sort_by_key(Finding::sort_key);
    skipped_files.sort_by(|a, b| a.file.cmp(&b.file));

    let (critical, warning, suggestion) = count_severities(&findings);
    let score = score::compute(&opts.weights, critical, warning, suggestion);
    let decision = score::decide(&opts.weights, score);

    ReviewResult {
        score,
        decision,
        findings,
        skipped_files,
        warnings: Vec::new(),
        publish: None,
    }
}

fn count_severities(findings: &[Finding]) -> (usize, usize, usize) {
    let mut c = (0, 0, 0);
    for f in findings {
        match f.severity {
            Severity::Critical => c.0 += 1,
            Severity::Warning => c.1 += 1,
            Severity::Suggestion => c.2 += 1,
        }
    }
    c
}
