//! revet core library.
//!
//! Programmatic access to the three-stage review pipeline: extract a
//! change-set into an immutable descriptor, evaluate a rule set against
//! it, and publish findings as pending line annotations.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `extract`: Change Extractor (git plumbing, revision pinning, buckets).
//! - `diffmap`: Unified-diff parsing into head-revision changed lines.
//! - `rules`: Baseline rule set, project rule loading, override shadowing.
//! - `evaluate`: Rule Evaluator (per-file matching, scoring input).
//! - `score`: Score formula and decision tiers.
//! - `publish`: Review Publisher (anchor validation, annotation sinks).
//! - `pipeline`: Sequencing of the three stages.
//! - `models`: Data models for descriptors, findings, and results.
//! - `output`: Human/JSON printers.
//! - `utils`: Supporting helpers.

pub mod cli;
pub mod config;
pub mod diffmap;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod rules;
pub mod score;
pub mod utils;
