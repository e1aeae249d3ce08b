//! Supporting helpers: message prefixes and path display.

use owo_colors::OwoColorize;
use std::path::Path;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Prefix for fatal error lines on stderr.
pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

/// Prefix for friendly notes on stderr.
pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// Prefix for informational lines on stderr.
pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Render `path` relative to the current working directory when possible.
pub fn rel_to_wd(path: &Path) -> String {
    let wd = std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf());
    pathdiff::diff_paths(path, &wd)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
