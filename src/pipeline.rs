//! Pipeline orchestration: Extractor → Evaluator → Publisher.
//!
//! The three stages run sequentially; the descriptor built by the
//! extractor is shared read-only with the later stages. Extract and
//! evaluate failures are fatal. Publish failures are fatal only for the
//! annotations not yet attempted; the accounting so far is kept.

use crate::config::Effective;
use crate::error::RevetError;
use crate::evaluate::{self, EvalOptions, GitSource};
use crate::extract;
use crate::models::change::ChangeDescriptor;
use crate::models::ReviewResult;
use crate::publish::{self, AnnotationSink, GhSink, LocalSink};
use crate::rules;

/// Everything one pipeline run produced.
pub struct PipelineRun {
    pub descriptor: ChangeDescriptor,
    pub result: ReviewResult,
    /// Backend failure that stopped publishing partway, if any.
    pub publish_error: Option<RevetError>,
}

fn make_sink(eff: &Effective, change_id: &str) -> Result<Box<dyn AnnotationSink>, RevetError> {
    match eff.backend.as_str() {
        "local" => Ok(Box::new(LocalSink::new(&eff.repo_root))),
        "github" => Ok(Box::new(GhSink::new(change_id))),
        other => Err(RevetError::Config(format!(
            "unknown publish backend '{}' (expected local|github)",
            other
        ))),
    }
}

/// Run the full pipeline for one change-set id.
pub fn run(change_id: &str, eff: &Effective) -> Result<PipelineRun, RevetError> {
    let descriptor = extract::extract(&eff.repo_root, change_id, &eff.base)?;

    let (rule_set, warnings) = rules::effective_rules(&eff.repo_root.join(&eff.rules_dir));
    let source = GitSource {
        root: &eff.repo_root,
        revision: &descriptor.revision,
    };
    let opts = EvalOptions {
        focus: eff.focus.clone(),
        file_filter: eff.file_filter.clone(),
        changed_only_default: eff.changed_only,
        weights: eff.weights,
    };
    let mut result = evaluate::evaluate(&descriptor, &rule_set, &opts, &source);
    result.warnings = warnings;

    let mut publish_error = None;
    if eff.publish_enabled {
        let mut sink = make_sink(eff, change_id)?;
        let (outcome, err) = publish::publish(&descriptor, &result.findings, &source, sink.as_mut());
        result.publish = Some(outcome);
        publish_error = err;
    }

    Ok(PipelineRun {
        descriptor,
        result,
        publish_error,
    })
}
