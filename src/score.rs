//! Score formula and decision tiers.
//!
//! The weights and thresholds are configuration defaults, not invariants:
//! `[score]` in revet.toml can change any of them. The score only ever
//! moves down from 100 and is floored at 0.

use crate::models::Decision;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
/// Per-severity deductions plus the two decision thresholds.
pub struct Weights {
    #[serde(default = "default_critical")]
    pub critical: u32,
    #[serde(default = "default_warning")]
    pub warning: u32,
    #[serde(default = "default_suggestion")]
    pub suggestion: u32,
    /// Minimum score for `pass`.
    #[serde(default = "default_pass")]
    pub pass: u32,
    /// Minimum score for `auto-pass`.
    #[serde(default = "default_auto_pass")]
    pub auto_pass: u32,
}

fn default_critical() -> u32 {
    20
}
fn default_warning() -> u32 {
    5
}
fn default_suggestion() -> u32 {
    1
}
fn default_pass() -> u32 {
    90
}
fn default_auto_pass() -> u32 {
    95
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            critical: default_critical(),
            warning: default_warning(),
            suggestion: default_suggestion(),
            pass: default_pass(),
            auto_pass: default_auto_pass(),
        }
    }
}

/// Compute the score from severity counts, floored at 0.
pub fn compute(weights: &Weights, critical: usize, warning: usize, suggestion: usize) -> u32 {
    let deduction = weights.critical.saturating_mul(critical as u32)
        + weights.warning.saturating_mul(warning as u32)
        + weights.suggestion.saturating_mul(suggestion as u32);
    100u32.saturating_sub(deduction)
}

/// Map a score onto its decision tier.
pub fn decide(weights: &Weights, score: u32) -> Decision {
    if score >= weights.auto_pass {
        Decision::AutoPass
    } else if score >= weights.pass {
        Decision::Pass
    } else {
        Decision::Blocked
    }
}
