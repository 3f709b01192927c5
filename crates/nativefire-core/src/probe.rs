//! File probing helpers
//!
//! Stateless existence checks and single-match name searches over a project
//! tree. Every function takes the project root explicitly; nothing here
//! retains state between calls.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

/// Default maximum search depth below the project root
pub const DEFAULT_SEARCH_DEPTH: usize = 12;

/// Directories to skip during search
const SKIP_DIRECTORIES: &[&str] = &[
    "node_modules",
    "build",
    "Pods",
    "DerivedData",
    ".build",
    ".gradle",
    ".dart_tool",
    ".git",
    ".idea",
    ".vscode",
    "target",
];

/// Directory extensions of Apple bundles, never descended into
const BUNDLE_EXTENSIONS: &[&str] = &[
    "xcodeproj",
    "xcworkspace",
    "xcassets",
    "xcframework",
    "framework",
    "bundle",
    "app",
    "appex",
    "lproj",
    "xcdatamodeld",
    "playground",
    "docc",
];

/// Check whether `rel` exists below `root` (file or directory)
pub fn exists(root: &Path, rel: impl AsRef<Path>) -> bool {
    root.join(rel).exists()
}

/// Check whether `rel` is a directory below `root`
pub fn is_dir(root: &Path, rel: impl AsRef<Path>) -> bool {
    root.join(rel).is_dir()
}

/// Return the first of `candidates` that exists below `root`
pub fn first_existing<'a>(root: &Path, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| exists(root, c))
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRECTORIES.contains(&name.as_ref())
}

/// Find the first entry whose file name matches `pattern`
///
/// The pattern is a shell-style glob applied to the entry name only
/// (`*.xcodeproj`, `MainActivity.kt`, `*App.swift`). Directories match too,
/// which is how bundle directories such as `Foo.xcodeproj` are found.
/// Returns `None` for an invalid pattern.
pub fn find_file(root: &Path, pattern: &str) -> Option<PathBuf> {
    find_file_where(root, pattern, DEFAULT_SEARCH_DEPTH, |_| true)
}

/// Like [`find_file`], but only accepts entries for which `accept` returns true
///
/// The walk is sorted by file name so repeated runs see the same first match.
pub fn find_file_where<F>(root: &Path, pattern: &str, max_depth: usize, mut accept: F) -> Option<PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    let pattern = match Pattern::new(pattern) {
        Ok(p) => p,
        Err(e) => {
            trace!("Invalid search pattern {:?}: {}", pattern, e);
            return None;
        }
    };

    let mut walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                trace!("Cannot read entry under {:?}: {}", root, err);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if pattern.matches(&name) && accept(entry.path()) {
            trace!("Probe matched {:?} for {}", entry.path(), pattern);
            return Some(entry.into_path());
        }

        if entry.file_type().is_dir() && is_bundle(entry.path()) {
            walker.skip_current_dir();
        }
    }

    None
}

/// Apple bundle directory such as `Foo.xcodeproj` or `Assets.xcassets`
fn is_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| BUNDLE_EXTENSIONS.contains(&e))
}

/// Check whether any entry name below `root` matches `pattern`
pub fn has_file(root: &Path, pattern: &str) -> bool {
    find_file(root, pattern).is_some()
}

/// Expand a root-relative path glob such as `ios/*.xcodeproj/project.pbxproj`
///
/// Results are sorted; unreadable entries are dropped.
pub fn glob_paths(root: &Path, rel_pattern: &str) -> Vec<PathBuf> {
    let base = Pattern::escape(&root.to_string_lossy());
    let full = format!("{}/{}", base.trim_end_matches('/'), rel_pattern);

    let mut paths: Vec<PathBuf> = match glob::glob(&full) {
        Ok(iter) => iter.flatten().collect(),
        Err(e) => {
            trace!("Invalid glob {:?}: {}", full, e);
            Vec::new()
        }
    };
    paths.sort();
    paths
}

/// Path of `path` relative to `root`, for display
pub fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
