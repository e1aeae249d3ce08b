//! revet CLI binary entry point.
//! Delegates to the pipeline modules and prints results.

mod cli;
mod config;
mod diffmap;
mod error;
mod evaluate;
mod extract;
mod models;
mod output;
mod pipeline;
mod publish;
mod rules;
mod score;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Review {
            change_id,
            repo_root,
            base,
            rules_dir,
            output,
            focus,
            files,
            no_score,
            publish,
            backend,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                base.as_deref(),
                rules_dir.as_deref(),
                output.as_deref(),
                if no_score { Some(false) } else { None },
                &focus,
                files.as_deref(),
                if publish { Some(true) } else { None },
                backend.as_deref(),
            );
            // Friendly note if no revet config was found
            if !eff.config_found && eff.output != "json" {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    "No revet.toml found; using defaults."
                );
            }
            match pipeline::run(&change_id, &eff) {
                Ok(run) => {
                    output::print_review(&run.descriptor, &run.result, &eff.output, eff.score_enabled);
                    if let Some(err) = run.publish_error {
                        eprintln!("{} {}", crate::utils::error_prefix(), err);
                        if let Some(hint) = err.hint() {
                            eprintln!("{} {}", crate::utils::note_prefix(), hint);
                        }
                        std::process::exit(err.exit_code());
                    }
                    // Exit 0 for any completed pipeline, whatever the decision.
                }
                Err(err) => {
                    eprintln!("{} {}", crate::utils::error_prefix(), err);
                    if let Some(hint) = err.hint() {
                        eprintln!("{} {}", crate::utils::note_prefix(), hint);
                    }
                    std::process::exit(err.exit_code());
                }
            }
        }
        Commands::Rules {
            repo_root,
            rules_dir,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                None,
                rules_dir.as_deref(),
                output.as_deref(),
                None,
                &[],
                None,
                None,
                None,
            );
            let (rule_set, warnings) = rules::effective_rules(&eff.repo_root.join(&eff.rules_dir));
            for w in &warnings {
                eprintln!("{} {}", crate::utils::note_prefix(), w);
            }
            output::print_rules(&rule_set, &eff.output);
        }
    }
}
