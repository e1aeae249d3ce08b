//! Change Extractor: resolves a change-set id to a pinned revision and
//! builds the immutable `ChangeDescriptor`.
//!
//! Resolution happens exactly once per run. Everything downstream reads
//! the pinned revision; nothing here is re-resolved later even if the
//! change-set moves under us.

use crate::error::RevetError;
use crate::models::change::{ChangeDescriptor, FileCategory, FileChange};
use std::path::Path;
use std::process::Command;

/// Run git in `root`, mapping failures onto the pipeline error taxonomy.
pub fn git(root: &Path, args: &[&str]) -> Result<String, RevetError> {
    let out = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .map_err(|e| RevetError::Git(format!("failed to run git: {}", e)))?;
    if out.status.success() {
        return Ok(String::from_utf8_lossy(&out.stdout).trim_end().to_string());
    }
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    let lower = stderr.to_lowercase();
    if lower.contains("not a git repository") || lower.contains("permission denied") {
        return Err(RevetError::Access(stderr.trim().to_string()));
    }
    if lower.contains("unknown revision")
        || lower.contains("bad revision")
        || lower.contains("ambiguous argument")
        || lower.contains("not a valid object name")
        || lower.contains("needed a single revision")
    {
        return Err(RevetError::NotFound(stderr.trim().to_string()));
    }
    Err(RevetError::Git(stderr.trim().to_string()))
}

/// Resolve a change id to a concrete commit.
///
/// Numeric ids follow the pull-request convention (`refs/pull/<n>/head`)
/// before falling back to a plain rev.
pub fn resolve_revision(root: &Path, change_id: &str) -> Result<String, RevetError> {
    if change_id.chars().all(|c| c.is_ascii_digit()) {
        let pr_ref = format!("refs/pull/{}/head", change_id);
        if let Ok(rev) = git(root, &["rev-parse", "--verify", "--quiet", &pr_ref]) {
            if !rev.is_empty() {
                return Ok(rev);
            }
        }
    }
    let spec = format!("{}^{{commit}}", change_id);
    match git(root, &["rev-parse", "--verify", &spec]) {
        Ok(rev) if !rev.is_empty() => Ok(rev),
        Ok(_) => Err(RevetError::NotFound(format!(
            "change-set '{}' did not resolve to a commit",
            change_id
        ))),
        Err(RevetError::Git(msg)) | Err(RevetError::NotFound(msg)) => Err(RevetError::NotFound(
            format!("change-set '{}': {}", change_id, msg),
        )),
        Err(e) => Err(e),
    }
}

/// Bucket a changed file by its path.
pub fn categorize(path: &str) -> FileCategory {
    let lower = path.to_lowercase();
    let name = lower.rsplit('/').next().unwrap_or(&lower);
    if lower.starts_with("tests/")
        || lower.contains("/tests/")
        || lower.contains("/test/")
        || name.ends_with("_test.rs")
        || name.ends_with(".test.ts")
        || name.ends_with(".test.js")
        || name.starts_with("test_")
    {
        return FileCategory::Test;
    }
    if lower.starts_with("docs/")
        || lower.contains("/docs/")
        || name.ends_with(".md")
        || name.ends_with(".rst")
        || name.ends_with(".adoc")
    {
        return FileCategory::Documentation;
    }
    if name.ends_with(".toml")
        || name.ends_with(".yaml")
        || name.ends_with(".yml")
        || name.ends_with(".json")
        || name.ends_with(".ini")
        || name.ends_with(".cfg")
        || name.ends_with(".lock")
        || name == "dockerfile"
        || lower.starts_with(".github/")
    {
        return FileCategory::Configuration;
    }
    FileCategory::Implementation
}

/// Collapse a rename numstat path (`dir/{old => new}/x` or `a => b`).
fn rename_target(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.find('}')) {
        if let Some(arrow) = path[open..close].find(" => ") {
            let new = &path[open + arrow + 4..close];
            let mut out = format!("{}{}{}", &path[..open], new, &path[close + 1..]);
            out = out.replace("//", "/");
            return out;
        }
    }
    if let Some((_, new)) = path.split_once(" => ") {
        return new.to_string();
    }
    path.to_string()
}

fn parse_numstat(numstat: &str) -> Vec<FileChange> {
    let mut files = Vec::new();
    for line in numstat.lines() {
        let mut parts = line.splitn(3, '\t');
        let (Some(added), Some(removed), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let path = rename_target(path.trim());
        files.push(FileChange {
            category: categorize(&path),
            path,
            // "-" marks binary files
            added: added.parse().unwrap_or(0),
            removed: removed.parse().unwrap_or(0),
        });
    }
    files
}

/// Build the `ChangeDescriptor` for one pipeline run.
pub fn extract(root: &Path, change_id: &str, base: &str) -> Result<ChangeDescriptor, RevetError> {
    let revision = resolve_revision(root, change_id)?;
    let base_rev = match git(root, &["merge-base", base, &revision]) {
        Ok(b) if !b.is_empty() => b,
        Ok(_) | Err(RevetError::NotFound(_)) => {
            return Err(RevetError::NotFound(format!(
                "base ref '{}' did not resolve; pass --base",
                base
            )))
        }
        Err(e) => return Err(e),
    };
    let numstat = git(root, &["diff", "--numstat", &base_rev, &revision])?;
    let diff = git(root, &["diff", &base_rev, &revision])?;
    Ok(ChangeDescriptor {
        id: change_id.to_string(),
        revision,
        base: base_rev,
        files: parse_numstat(&numstat),
        diff,
    })
}
