//! Shared data models for the review pipeline.

pub mod change;
pub mod rulefile;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Severity assigned to a finding. Ordering is by impact: critical first.
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl Severity {
    /// Sort rank: lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Suggestion => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Rule category. Unrecognized values deserialize to `Unknown`; findings
/// from such rules are kept but demoted to suggestion severity.
pub enum Category {
    Security,
    ErrorHandling,
    Style,
    Performance,
    ProjectOverride,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::ErrorHandling => "error-handling",
            Category::Style => "style",
            Category::Performance => "performance",
            Category::ProjectOverride => "project-override",
            Category::Unknown => "unknown",
        }
    }

    /// Parse a focus token from the CLI/config. Unlike rule files, an
    /// unrecognized focus token is an input mistake and yields `None`.
    pub fn parse_token(s: &str) -> Option<Category> {
        match s.trim() {
            "security" => Some(Category::Security),
            "error-handling" => Some(Category::ErrorHandling),
            "style" => Some(Category::Style),
            "performance" => Some(Category::Performance),
            "project-override" => Some(Category::ProjectOverride),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// One rule match anchored at a line of the post-change revision.
///
/// `line` is 1-based and always resolved against the pinned revision's
/// version of `file`, never the base version and never a diff offset.
pub struct Finding {
    pub file: String,
    pub line: usize,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub snippet: String,
    pub suggestion: Option<String>,
    pub rule: String,
}

impl Finding {
    /// Stable ordering key: (file, line, severity rank).
    pub fn sort_key(&self) -> (String, usize, u8) {
        (self.file.clone(), self.line, self.severity.rank())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Decision tier derived from the score.
pub enum Decision {
    AutoPass,
    Pass,
    Blocked,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::AutoPass => "auto-pass",
            Decision::Pass => "pass",
            Decision::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// A file the evaluator could not read at the pinned revision.
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
/// One annotation the publisher declined, with the anchor that failed.
pub struct SkippedAnnotation {
    pub file: String,
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregate publish accounting; the only channel for partial failure.
pub struct PublishOutcome {
    pub created: usize,
    pub skipped: usize,
    /// Findings never reached because the backend failed mid-run.
    pub not_attempted: usize,
    pub skips: Vec<SkippedAnnotation>,
}

#[derive(Debug, Serialize)]
/// Aggregate review output for one pipeline run.
pub struct ReviewResult {
    pub score: u32,
    pub decision: Decision,
    pub findings: Vec<Finding>,
    pub skipped_files: Vec<SkippedFile>,
    /// Rule-load degradations (malformed files, bad regexes).
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishOutcome>,
}

impl ReviewResult {
    /// Count findings per severity as (critical, warning, suggestion).
    pub fn severity_counts(&self) -> (usize, usize, usize) {
        let mut c = (0, 0, 0);
        for f in &self.findings {
            match f.severity {
                Severity::Critical => c.0 += 1,
                Severity::Warning => c.1 += 1,
                Severity::Suggestion => c.2 += 1,
            }
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_orders_critical_first() {
        assert!(Severity::Critical.rank() < Severity::Warning.rank());
        assert!(Severity::Warning.rank() < Severity::Suggestion.rank());
    }

    #[test]
    fn test_category_round_trip_and_unknown() {
        let c: Category = serde_json::from_str("\"error-handling\"").unwrap();
        assert_eq!(c, Category::ErrorHandling);
        let u: Category = serde_json::from_str("\"no-such-bucket\"").unwrap();
        assert_eq!(u, Category::Unknown);
        assert_eq!(Category::parse_token("no-such-bucket"), None);
    }

    #[test]
    fn test_severity_counts() {
        let res = ReviewResult {
            score: 63,
            decision: Decision::Blocked,
            findings: vec![
                finding("a.rs", 1, Severity::Critical),
                finding("a.rs", 2, Severity::Warning),
                finding("b.rs", 1, Severity::Suggestion),
            ],
            skipped_files: vec![],
            warnings: vec![],
            publish: None,
        };
        assert_eq!(res.severity_counts(), (1, 1, 1));
    }

    fn finding(file: &str, line: usize, severity: Severity) -> Finding {
        Finding {
            file: file.into(),
            line,
            severity,
            category: Category::Style,
            message: "m".into(),
            snippet: "s".into(),
            suggestion: None,
            rule: "r".into(),
        }
    }
}
