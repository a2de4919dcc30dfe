//! Project tree walking with the shared ignore set.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into or listed: version control,
/// dependency caches, build output and the project memory directory.
pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    "dist",
    "build",
    ".eggs",
    ".mypy_cache",
    ".pytest_cache",
    ".next",
    ".nuxt",
    "coverage",
    ".tox",
    orangutan_config::MEMORY_DIR,
    "target",
];

pub fn is_ignored_name(name: &str) -> bool {
    IGNORED_DIRS.contains(&name)
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(is_ignored_name)
}

/// All regular files under `root`, in sorted walk order, skipping ignored
/// directories and entries that cannot be read.
pub fn project_files(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
}

/// `path` relative to `root`, always with `/` separators.
pub fn display_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
