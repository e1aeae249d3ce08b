//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "revet",
    version,
    about = "Rule-driven change review: extract, evaluate, publish",
    long_about = "revet — a tiny, fast CLI that pins a change-set to a revision, evaluates rule-driven review findings against it, and publishes line annotations into a pending batch.\n\nConfiguration precedence: CLI > revet.toml > defaults.",
    after_help = "Examples:\n  revet review 128\n  revet review feature-auth --base main --output json\n  revet review 128 --focus security,error-handling --publish\n  revet rules --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current revet version.")]
    Version,
    /// Run the review pipeline for a change-set
    #[command(
        about = "Review a change-set",
        long_about = "Resolve the change-set to a pinned revision, evaluate the effective rule set against every changed file's content at that revision, and print the score, decision, and findings. With --publish, findings become line annotations in a pending batch.",
        after_help = "Examples:\n  revet review 128\n  revet review feature-auth --files 'src/**/*.rs'\n  revet review 128 --publish --backend github"
    )]
    Review {
        #[arg(help = "Change-set id: PR number, branch, or rev")]
        change_id: String,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Base ref for the merge-base diff (default: main)")]
        base: Option<String>,
        #[arg(long, help = "Directory of project rule files (default: .revet/rules)")]
        rules_dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Comma-separated categories to evaluate (default: all)")]
        focus: Vec<String>,
        #[arg(long, help = "Glob restricting which changed files are evaluated")]
        files: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Hide score and decision in human output")]
        no_score: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Create pending annotations for findings")]
        publish: bool,
        #[arg(long, help = "Publish backend: local|github (default: local)")]
        backend: Option<String>,
    },
    /// List the effective rule set (baseline + project overrides)
    #[command(
        about = "List effective rules",
        long_about = "Show the rule set a review would run with: built-in baseline rules merged with project rules, override shadowing applied."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Directory of project rule files (default: .revet/rules)")]
        rules_dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
