//! Output rendering for review results and rule listings.
//!
//! Supports `human` (default) and `json` outputs. The JSON form is
//! composed by pure functions so its shape is testable without I/O.

use crate::models::change::ChangeDescriptor;
use crate::models::{ReviewResult, Severity};
use crate::rules::{Rule, RuleSource};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn severity_tag(sev: Severity, color: bool) -> String {
    match sev {
        Severity::Critical => {
            if color {
                "[critical]".red().bold().to_string()
            } else {
                "[critical]".to_string()
            }
        }
        Severity::Warning => {
            if color {
                "[warning]".yellow().bold().to_string()
            } else {
                "[warning]".to_string()
            }
        }
        Severity::Suggestion => {
            if color {
                "[suggestion]".blue().bold().to_string()
            } else {
                "[suggestion]".to_string()
            }
        }
    }
}

fn severity_icon(sev: Severity, color: bool) -> String {
    let icon = match sev {
        Severity::Critical => "✖",
        Severity::Warning => "▲",
        Severity::Suggestion => "◆",
    };
    if !color {
        return icon.to_string();
    }
    match sev {
        Severity::Critical => icon.red().to_string(),
        Severity::Warning => icon.yellow().to_string(),
        Severity::Suggestion => icon.blue().to_string(),
    }
}

/// Print a review result in the requested format.
pub fn print_review(
    descriptor: &ChangeDescriptor,
    res: &ReviewResult,
    output: &str,
    score_enabled: bool,
) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_review_json(descriptor, res)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for w in &res.warnings {
                eprintln!("{} {}", crate::utils::note_prefix(), w);
            }
            for sk in &res.skipped_files {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    format!("skipped {}: {}", sk.file, sk.reason)
                );
            }
            for f in &res.findings {
                let loc = format!("{}:{}", f.file, f.line);
                let loc = if color { loc.bold().to_string() } else { loc };
                println!(
                    "{} {} {} ❲{}❳ — {}",
                    severity_icon(f.severity, color),
                    severity_tag(f.severity, color),
                    loc,
                    f.rule,
                    f.message
                );
                if let Some(fix) = &f.suggestion {
                    println!("    fix: {}", fix);
                }
            }
            let (c, w, s) = res.severity_counts();
            let mut summary = format!(
                "— Review — change={} revision={} critical={} warnings={} suggestions={} files={}",
                descriptor.id,
                &descriptor.revision[..descriptor.revision.len().min(12)],
                c,
                w,
                s,
                descriptor.files.len()
            );
            if score_enabled {
                summary.push_str(&format!(
                    " score={} decision={}",
                    res.score,
                    res.decision.as_str()
                ));
            }
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
            if let Some(p) = &res.publish {
                println!(
                    "— Publish — created={} skipped={} not_attempted={}",
                    p.created, p.skipped, p.not_attempted
                );
                for sk in &p.skips {
                    println!("  skipped {}:{} ({})", sk.file, sk.line, sk.reason);
                }
            }
        }
    }
}

/// Print the effective rule set.
pub fn print_rules(rules: &[Rule], output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_rules_json(rules)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for r in rules {
                let source = match r.source {
                    RuleSource::Baseline => "baseline",
                    RuleSource::Project => "project",
                };
                let id = if color {
                    r.id.clone().bold().to_string()
                } else {
                    r.id.clone()
                };
                println!(
                    "{} {} {} [{}] {}",
                    id,
                    r.category.as_str(),
                    severity_tag(r.severity, color),
                    source,
                    r.message
                );
            }
            println!("— {} rules —", rules.len());
        }
    }
}

/// Compose review JSON object (pure) for testing/snapshot purposes.
///
/// The structured form always carries score and decision; `scoreEnabled`
/// only gates the human rendering.
pub fn compose_review_json(descriptor: &ChangeDescriptor, res: &ReviewResult) -> JsonVal {
    json!({
        "change": {
            "id": descriptor.id,
            "revision": descriptor.revision,
            "base": descriptor.base,
            "files": serde_json::to_value(&descriptor.files).unwrap(),
        },
        "review": serde_json::to_value(res).unwrap(),
    })
}

/// Compose rules JSON array (pure) for testing/snapshot purposes.
pub fn compose_rules_json(rules: &[Rule]) -> JsonVal {
    let items: Vec<_> = rules
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "category": r.category.as_str(),
                "severity": r.severity.as_str(),
                "pattern": r.pattern,
                "source": match r.source {
                    RuleSource::Baseline => "baseline",
                    RuleSource::Project => "project",
                },
            })
        })
        .collect();
    json!({"rules": items, "total": rules.len()})
}
