//! Configuration discovery and effective settings resolution.
//!
//! revet reads `revet.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `base`: `main`
//! - `rules_dir`: `.revet/rules`
//! - `output`: `human`
//! - `review.score`: true
//! - `review.focus`: empty (all categories)
//! - `publish.backend`: `local`, `publish.enabled`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::models::Category;
use crate::score::Weights;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Review-related configuration section under `[review]`.
pub struct ReviewCfg {
    pub score: Option<bool>,
    pub focus: Option<Vec<String>>,
    pub files: Option<String>,
    pub changed_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Publish-related configuration section under `[publish]`.
pub struct PublishCfg {
    pub backend: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `revet.toml|yaml`.
pub struct RevetConfig {
    pub base: Option<String>,
    pub rules_dir: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub review: Option<ReviewCfg>,
    #[serde(default)]
    pub score: Option<Weights>,
    #[serde(default)]
    pub publish: Option<PublishCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub base: String,
    pub rules_dir: String,
    pub output: String,
    pub score_enabled: bool,
    /// Enabled categories; empty means all.
    pub focus: Vec<Category>,
    pub file_filter: Option<String>,
    pub changed_only: bool,
    pub weights: Weights,
    pub publish_enabled: bool,
    pub backend: String,
    /// Whether a `revet.toml|yaml|yml` was actually discovered.
    pub config_found: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `revet.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("revet.toml").exists()
            || cur.join("revet.yaml").exists()
            || cur.join("revet.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RevetConfig` from `revet.toml` or `revet.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<RevetConfig> {
    let toml_path = root.join("revet.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: RevetConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["revet.yaml", "revet.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: RevetConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Parse focus tokens, separating recognized categories from mistakes.
pub fn parse_focus(tokens: &[String]) -> (Vec<Category>, Vec<String>) {
    let mut cats = Vec::new();
    let mut bad = Vec::new();
    for t in tokens {
        for tok in t.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match Category::parse_token(tok) {
                Some(c) => {
                    if !cats.contains(&c) {
                        cats.push(c);
                    }
                }
                None => bad.push(tok.to_string()),
            }
        }
    }
    (cats, bad)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_base: Option<&str>,
    cli_rules_dir: Option<&str>,
    cli_output: Option<&str>,
    cli_score: Option<bool>,
    cli_focus: &[String],
    cli_files: Option<&str>,
    cli_publish: Option<bool>,
    cli_backend: Option<&str>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root);
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let base = cli_base
        .map(|s| s.to_string())
        .or(cfg.base)
        .unwrap_or_else(|| "main".to_string());
    let rules_dir = cli_rules_dir
        .map(|s| s.to_string())
        .or(cfg.rules_dir)
        .unwrap_or_else(|| ".revet/rules".to_string());
    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let score_enabled = cli_score
        .or_else(|| cfg.review.as_ref().and_then(|r| r.score))
        .unwrap_or(true);
    let focus_tokens: Vec<String> = if cli_focus.is_empty() {
        cfg.review
            .as_ref()
            .and_then(|r| r.focus.clone())
            .unwrap_or_default()
    } else {
        cli_focus.to_vec()
    };
    let (focus, bad) = parse_focus(&focus_tokens);
    for tok in bad {
        eprintln!(
            "{} {}",
            crate::utils::note_prefix(),
            format!("ignoring unknown focus category '{}'", tok)
        );
    }
    let file_filter = cli_files
        .map(|s| s.to_string())
        .or_else(|| cfg.review.as_ref().and_then(|r| r.files.clone()));
    let changed_only = cfg
        .review
        .as_ref()
        .and_then(|r| r.changed_only)
        .unwrap_or(false);

    let weights = cfg.score.unwrap_or_default();

    let publish_enabled = cli_publish
        .or_else(|| cfg.publish.as_ref().and_then(|p| p.enabled))
        .unwrap_or(false);
    let backend = cli_backend
        .map(|s| s.to_string())
        .or_else(|| cfg.publish.as_ref().and_then(|p| p.backend.clone()))
        .unwrap_or_else(|| "local".to_string());

    Effective {
        repo_root,
        base,
        rules_dir,
        output,
        score_enabled,
        focus,
        file_filter,
        changed_only,
        weights,
        publish_enabled,
        backend,
        config_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("revet.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
base = "develop"
rules_dir = "review/rules"
output = "json"
[review]
score = false
focus = ["security", "style"]
"#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(
            root.to_str(),
            None,
            None,
            None,
            None,
            &[],
            None,
            None,
            None,
        );
        assert_eq!(eff.base, "develop");
        assert_eq!(eff.rules_dir, "review/rules");
        assert_eq!(eff.output, "json");
        assert!(!eff.score_enabled);
        assert_eq!(eff.focus, vec![Category::Security, Category::Style]);
        assert!(eff.config_found);
    }

    #[test]
    fn test_no_config_file_resolves_defaults() {
        let dir = tempdir().unwrap();
        let eff = resolve_effective(
            dir.path().to_str(),
            None,
            None,
            None,
            None,
            &[],
            None,
            None,
            None,
        );
        assert!(!eff.config_found);
        assert_eq!(eff.base, "main");
        assert_eq!(eff.rules_dir, ".revet/rules");
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("revet.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
base: main
output: human
publish:
  backend: github
"#
        )
        .unwrap();

        let eff = resolve_effective(
            root.to_str(),
            None,
            None,
            None,
            None,
            &[],
            None,
            None,
            None,
        );
        assert_eq!(eff.base, "main");
        assert_eq!(eff.rules_dir, ".revet/rules");
        assert_eq!(eff.backend, "github");
        // publishing stays opt-in even with a backend configured
        assert!(!eff.publish_enabled);
        assert!(eff.score_enabled);
        assert_eq!(eff.weights.critical, 20);
    }

    #[test]
    fn test_cli_precedence_and_score_weights() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("revet.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
[score]
critical = 30
pass = 85
[publish]
enabled = true
"#
        )
        .unwrap();

        // CLI output=human should win over config json; CLI publish=false over enabled=true
        let eff = resolve_effective(
            root.to_str(),
            Some("release"),
            None,
            Some("human"),
            None,
            &[],
            Some("src/**/*.rs"),
            Some(false),
            None,
        );
        assert_eq!(eff.output, "human");
        assert_eq!(eff.base, "release");
        assert!(!eff.publish_enabled);
        assert_eq!(eff.file_filter.as_deref(), Some("src/**/*.rs"));
        assert_eq!(eff.weights.critical, 30);
        assert_eq!(eff.weights.warning, 5);
        assert_eq!(eff.weights.pass, 85);
        assert_eq!(eff.weights.auto_pass, 95);
    }

    #[test]
    fn test_parse_focus_splits_and_dedups() {
        let (cats, bad) = parse_focus(&[
            "security,style".to_string(),
            "style".to_string(),
            "bogus".to_string(),
        ]);
        assert_eq!(cats, vec![Category::Security, Category::Style]);
        assert_eq!(bad, vec!["bogus".to_string()]);
    }
}
