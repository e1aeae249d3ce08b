//! Change descriptor: the immutable snapshot of one reviewable change-set.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Bucket a changed file falls into, by path pattern.
pub enum FileCategory {
    Implementation,
    Test,
    Documentation,
    Configuration,
}

impl FileCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Implementation => "implementation",
            FileCategory::Test => "test",
            FileCategory::Documentation => "documentation",
            FileCategory::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// One changed file with its bucket and diff stats.
pub struct FileChange {
    pub path: String,
    pub category: FileCategory,
    pub added: usize,
    pub removed: usize,
}

#[derive(Debug, Serialize)]
/// Immutable snapshot of a change-set, constructed once by the extractor
/// and consumed by the evaluator and publisher by shared reference.
///
/// `revision` is pinned exactly once per run; all line numbers downstream
/// are resolved against it. Re-resolving mid-pipeline would desynchronize
/// anchors if the author pushes concurrently, so no later stage may do so.
pub struct ChangeDescriptor {
    /// The change-set identifier as given (PR number, branch, rev).
    pub id: String,
    /// Fully resolved head commit id.
    pub revision: String,
    /// Merge base the diff was computed against.
    pub base: String,
    pub files: Vec<FileChange>,
    /// Raw unified diff; source of truth for head-revision line mapping.
    pub diff: String,
}

impl ChangeDescriptor {
    /// Whether `path` is part of the change-set's tracked file list.
    pub fn contains_file(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}
