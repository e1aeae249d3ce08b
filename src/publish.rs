//! Review Publisher: renders findings into line-anchored annotations.
//!
//! Every annotation is validated against the pinned revision before it is
//! created: the file must still be in the change-set's file list and the
//! line must exist in that file at the revision. A failed check skips only
//! that annotation. Annotations land in a pending batch which revet never
//! finalizes; publishing for human visibility is an external act.

use crate::error::RevetError;
use crate::evaluate::RevisionSource;
use crate::models::change::ChangeDescriptor;
use crate::models::{Finding, PublishOutcome, SkippedAnnotation};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const REASON_FILE_NOT_IN_CHANGESET: &str = "file not in change-set";
pub const REASON_LINE_OUT_OF_RANGE: &str = "line out of range";
pub const REASON_FILE_UNREADABLE: &str = "file unreadable at revision";

#[derive(Debug, Clone)]
/// One pending annotation, fully anchored.
pub struct Annotation {
    pub revision: String,
    pub file: String,
    pub line: usize,
    pub body: String,
}

/// Where annotations go. One sink instance corresponds to one pending
/// batch; a sink failure aborts the remaining unpublished annotations.
pub trait AnnotationSink {
    fn create(&mut self, annotation: &Annotation) -> Result<(), RevetError>;

    /// Seal the batch once every annotation has been created. Sinks that
    /// persist each annotation eagerly need no sealing step.
    fn finish(&mut self) -> Result<(), RevetError> {
        Ok(())
    }
}

/// Default sink: appends to `.revet/pending/<revision>.jsonl` under the
/// repository root.
pub struct LocalSink {
    dir: PathBuf,
}

impl LocalSink {
    pub fn new(repo_root: &Path) -> LocalSink {
        LocalSink {
            dir: repo_root.join(".revet/pending"),
        }
    }

    pub fn batch_path(&self, revision: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", revision))
    }
}

impl AnnotationSink for LocalSink {
    fn create(&mut self, a: &Annotation) -> Result<(), RevetError> {
        fs::create_dir_all(&self.dir)?;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.batch_path(&a.revision))?;
        let record = json!({
            "revision": a.revision,
            "file": a.file,
            "line": a.line,
            "body": a.body,
            "state": "pending",
        });
        writeln!(f, "{}", record)?;
        Ok(())
    }
}

/// GitHub sink: accumulates annotations and creates one pending review
/// per run through the `gh` CLI. Omitting the `event` field leaves the
/// review in the pending state for a human to submit.
pub struct GhSink {
    pub change_id: String,
    batch: Vec<Annotation>,
}

impl GhSink {
    pub fn new(change_id: &str) -> GhSink {
        GhSink {
            change_id: change_id.to_string(),
            batch: Vec::new(),
        }
    }
}

/// Request body for a pending review. No `event` key: supplying one
/// would submit the review instead of leaving it pending.
pub fn pending_review_body(revision: &str, batch: &[Annotation]) -> serde_json::Value {
    let comments: Vec<serde_json::Value> = batch
        .iter()
        .map(|a| {
            json!({
                "path": a.file,
                "line": a.line,
                "side": "RIGHT",
                "body": a.body,
            })
        })
        .collect();
    json!({
        "commit_id": revision,
        "comments": comments,
    })
}

impl AnnotationSink for GhSink {
    fn create(&mut self, a: &Annotation) -> Result<(), RevetError> {
        self.batch.push(a.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RevetError> {
        let Some(revision) = self.batch.first().map(|a| a.revision.clone()) else {
            return Ok(());
        };
        let endpoint = format!("repos/{{owner}}/{{repo}}/pulls/{}/reviews", self.change_id);
        let body = pending_review_body(&revision, &self.batch);
        let mut child = std::process::Command::new("gh")
            .args(["api", &endpoint, "--method", "POST", "--input", "-"])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| RevetError::Publish(format!("failed to run gh: {}", e)))?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(body.to_string().as_bytes())
                .map_err(|e| RevetError::Publish(format!("failed to write gh input: {}", e)))?;
        }
        let out = child
            .wait_with_output()
            .map_err(|e| RevetError::Publish(format!("failed to run gh: {}", e)))?;
        if out.status.success() {
            Ok(())
        } else {
            Err(RevetError::Publish(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ))
        }
    }
}

/// Render the annotation body for a finding.
pub fn render_body(finding: &Finding) -> String {
    let mut body = format!(
        "[{}] {}\n\n```\n{}\n```",
        finding.severity.as_str(),
        finding.message,
        finding.snippet
    );
    if let Some(fix) = &finding.suggestion {
        body.push_str(&format!("\n\nSuggested fix: {}", fix));
    }
    body.push_str(&format!("\n\n(rule: {})", finding.rule));
    body
}

/// Publish findings as pending annotations.
///
/// Returns the accounting plus the backend error that stopped the run, if
/// any. Skips never stop the run; a sink failure stops only the remaining
/// annotations and leaves the counts accumulated so far intact, with the
/// unreached findings tallied in `not_attempted`.
pub fn publish(
    descriptor: &ChangeDescriptor,
    findings: &[Finding],
    source: &dyn RevisionSource,
    sink: &mut dyn AnnotationSink,
) -> (PublishOutcome, Option<RevetError>) {
    let mut outcome = PublishOutcome::default();
    // Line counts at the pinned revision, read once per file.
    let mut line_counts: HashMap<String, Option<usize>> = HashMap::new();
    for (i, finding) in findings.iter().enumerate() {
        if !descriptor.contains_file(&finding.file) {
            skip(&mut outcome, finding, REASON_FILE_NOT_IN_CHANGESET);
            continue;
        }
        let count = line_counts
            .entry(finding.file.clone())
            .or_insert_with(|| source.read_file(&finding.file).ok().map(|s| s.lines().count()));
        match count {
            None => {
                skip(&mut outcome, finding, REASON_FILE_UNREADABLE);
                continue;
            }
            Some(n) if finding.line < 1 || finding.line > *n => {
                skip(&mut outcome, finding, REASON_LINE_OUT_OF_RANGE);
                continue;
            }
            Some(_) => {}
        }
        let annotation = Annotation {
            revision: descriptor.revision.clone(),
            file: finding.file.clone(),
            line: finding.line,
            body: render_body(finding),
        };
        if let Err(e) = sink.create(&annotation) {
            outcome.not_attempted = findings.len() - i;
            return (outcome, Some(e));
        }
        outcome.created += 1;
    }
    if let Err(e) = sink.finish() {
        return (outcome, Some(e));
    }
    (outcome, None)
}

fn skip(outcome: &mut PublishOutcome, finding: &Finding, reason: &str) {
    outcome.skipped += 1;
    outcome.skips.push(SkippedAnnotation {
        file: finding.file.clone(),
        line: finding.line,
        reason: reason.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::{FileCategory, FileChange};
    use crate::models::{Category, Severity};
    use std::collections::HashMap as Map;
    use tempfile::tempdir;

    struct MapSource(Map<String, String>);

    impl RevisionSource for MapSource {
        fn read_file(&self, path: &str) -> Result<String, String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| "missing".to_string())
        }
    }

    #[derive(Default)]
    struct VecSink {
        created: Vec<Annotation>,
        fail_after: Option<usize>,
        finished: bool,
    }

    impl AnnotationSink for VecSink {
        fn create(&mut self, a: &Annotation) -> Result<(), RevetError> {
            if let Some(limit) = self.fail_after {
                if self.created.len() >= limit {
                    return Err(RevetError::Publish("backend unreachable".into()));
                }
            }
            self.created.push(a.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), RevetError> {
            self.finished = true;
            Ok(())
        }
    }

    fn descriptor(files: &[&str]) -> ChangeDescriptor {
        ChangeDescriptor {
            id: "7".into(),
            revision: "cafebabe".into(),
            base: "b".into(),
            files: files
                .iter()
                .map(|p| FileChange {
                    path: (*p).into(),
                    category: FileCategory::Implementation,
                    added: 1,
                    removed: 0,
                })
                .collect(),
            diff: String::new(),
        }
    }

    fn finding(file: &str, line: usize) -> Finding {
        Finding {
            file: file.into(),
            line,
            severity: Severity::Warning,
            category: Category::ErrorHandling,
            message: "m".into(),
            snippet: "s".into(),
            suggestion: Some("fix".into()),
            rule: "r".into(),
        }
    }

    #[test]
    fn test_valid_anchor_creates_pending_annotation() {
        let desc = descriptor(&["src/a.rs"]);
        let src = MapSource(Map::from([("src/a.rs".to_string(), "l1\nl2\nl3\n".to_string())]));
        let mut sink = VecSink::default();
        let (out, err) = publish(&desc, &[finding("src/a.rs", 2)], &src, &mut sink);
        assert!(err.is_none());
        assert_eq!(out.created, 1);
        assert_eq!(out.skipped, 0);
        assert_eq!(sink.created[0].revision, "cafebabe");
        assert_eq!(sink.created[0].line, 2);
        assert!(sink.created[0].body.contains("(rule: r)"));
    }

    #[test]
    fn test_stale_line_skipped_others_succeed() {
        let desc = descriptor(&["src/a.rs"]);
        let src = MapSource(Map::from([("src/a.rs".to_string(), "l1\nl2\n".to_string())]));
        let mut sink = VecSink::default();
        let (out, err) = publish(
            &desc,
            &[finding("src/a.rs", 1), finding("src/a.rs", 99)],
            &src,
            &mut sink,
        );
        assert!(err.is_none());
        assert_eq!(out.created, 1);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.skips[0].reason, REASON_LINE_OUT_OF_RANGE);
        assert_eq!(out.skips[0].line, 99);
    }

    #[test]
    fn test_file_outside_changeset_skipped() {
        let desc = descriptor(&["src/a.rs"]);
        let src = MapSource(Map::from([("src/a.rs".to_string(), "l1\n".to_string())]));
        let mut sink = VecSink::default();
        let (out, err) = publish(&desc, &[finding("src/other.rs", 1)], &src, &mut sink);
        assert!(err.is_none());
        assert_eq!(out.created, 0);
        assert_eq!(out.skips[0].reason, REASON_FILE_NOT_IN_CHANGESET);
    }

    #[test]
    fn test_backend_failure_stops_remaining_keeps_counts() {
        let desc = descriptor(&["src/a.rs"]);
        let src = MapSource(Map::from([(
            "src/a.rs".to_string(),
            "l1\nl2\nl3\n".to_string(),
        )]));
        let mut sink = VecSink {
            fail_after: Some(1),
            ..VecSink::default()
        };
        let (out, err) = publish(
            &desc,
            &[finding("src/a.rs", 1), finding("src/a.rs", 2), finding("src/a.rs", 3)],
            &src,
            &mut sink,
        );
        assert!(matches!(err, Some(RevetError::Publish(_))));
        assert_eq!(out.created, 1);
        assert_eq!(out.skipped, 0);
        // the annotation that hit the failure and the one behind it
        assert_eq!(out.not_attempted, 2);
        assert_eq!(sink.created.len(), 1);
        assert!(!sink.finished);
    }

    #[test]
    fn test_clean_run_seals_the_batch() {
        let desc = descriptor(&["src/a.rs"]);
        let src = MapSource(Map::from([("src/a.rs".to_string(), "l1\nl2\n".to_string())]));
        let mut sink = VecSink::default();
        let (out, err) = publish(&desc, &[finding("src/a.rs", 1)], &src, &mut sink);
        assert!(err.is_none());
        assert_eq!(out.created, 1);
        assert_eq!(out.not_attempted, 0);
        assert!(sink.finished);
    }

    #[test]
    fn test_pending_review_body_carries_no_event() {
        let a = Annotation {
            revision: "cafebabe".into(),
            file: "src/a.rs".into(),
            line: 3,
            body: "[warning] m".into(),
        };
        let body = pending_review_body("cafebabe", &[a.clone(), a]);
        assert_eq!(body["commit_id"], "cafebabe");
        assert_eq!(body["comments"].as_array().unwrap().len(), 2);
        assert_eq!(body["comments"][0]["path"], "src/a.rs");
        assert_eq!(body["comments"][0]["side"], "RIGHT");
        // an `event` key would submit the review instead of leaving it pending
        assert!(body.get("event").is_none());
    }

    #[test]
    fn test_gh_sink_finish_with_empty_batch_is_a_no_op() {
        let mut sink = GhSink::new("7");
        assert!(sink.finish().is_ok());
    }

    #[test]
    fn test_local_sink_appends_jsonl_batch() {
        let dir = tempdir().unwrap();
        let mut sink = LocalSink::new(dir.path());
        let a = Annotation {
            revision: "cafebabe".into(),
            file: "src/a.rs".into(),
            line: 3,
            body: "[warning] m".into(),
        };
        sink.create(&a).unwrap();
        sink.create(&a).unwrap();
        let path = dir.path().join(".revet/pending/cafebabe.jsonl");
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let rec: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(rec["state"], "pending");
        assert_eq!(rec["line"], 3);
    }
}
