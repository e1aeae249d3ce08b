//! Unified-diff line mapping.
//!
//! The descriptor's raw diff is the source of truth for which lines of the
//! head revision a change touched. Rules with `changed_only` consult this
//! map; everything else in the pipeline works on full file content.

use std::collections::{BTreeSet, HashMap};

/// Per-file set of 1-based line numbers (in the head revision) that the
/// diff added or modified.
pub type ChangedLines = HashMap<String, BTreeSet<usize>>;

fn target_path(line: &str) -> Option<String> {
    let rest = line.strip_prefix("+++ ")?;
    if rest == "/dev/null" {
        return None;
    }
    Some(rest.strip_prefix("b/").unwrap_or(rest).trim().to_string())
}

fn hunk_new_start(line: &str) -> Option<usize> {
    // "@@ -a,b +c,d @@" (counts optional)
    let plus = line.split(' ').find(|t| t.starts_with('+'))?;
    let num = plus[1..].split(',').next()?;
    num.parse().ok()
}

/// Parse a unified diff into the changed-lines map for the head revision.
///
/// Only `+` lines count: context lines were not changed, and `-` lines do
/// not exist at the head revision at all.
pub fn changed_lines(diff: &str) -> ChangedLines {
    let mut map: ChangedLines = HashMap::new();
    let mut current: Option<String> = None;
    let mut new_line: usize = 0;
    for line in diff.lines() {
        if line.starts_with("diff ") {
            current = None;
            continue;
        }
        if line.starts_with("+++ ") {
            current = target_path(line);
            continue;
        }
        if line.starts_with("@@") {
            if let Some(start) = hunk_new_start(line) {
                new_line = start;
            }
            continue;
        }
        let Some(path) = current.as_ref() else {
            continue;
        };
        if line.starts_with("+") {
            map.entry(path.clone()).or_default().insert(new_line);
            new_line += 1;
        } else if line.starts_with("-") || line.starts_with("\\") {
            // removed line or "\ No newline at end of file": no head line consumed
        } else {
            // context line
            new_line += 1;
        }
    }
    map
}
