use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

/// Whether `path` carries one of the configured audio extensions.
pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn expand_dir(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the directory's own entries.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path(), settings))
        .map(|e| absolute(e.path()))
        .collect()
}

/// Turn user-supplied paths into playable file locators.
///
/// Directories are expanded (honoring the recursion, depth, hidden-file and
/// symlink settings) and the combined result is sorted lexicographically by
/// path. Unsupported or missing files are dropped with a warning.
pub fn expand_paths(paths: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut out = Vec::new();

    for path in paths {
        if path.is_dir() {
            out.extend(expand_dir(path, settings));
        } else if !path.exists() {
            warn!(path = %path.display(), "skipping missing file");
        } else if is_audio_file(path, settings) {
            out.push(absolute(path));
        } else {
            warn!(path = %path.display(), "skipping unsupported media");
        }
    }

    out.sort();
    out
}

/// Resolve a saved locator back to a file, or `None` when it no longer
/// points at a supported file.
pub fn resolve_locator(locator: &str, settings: &LibrarySettings) -> Option<PathBuf> {
    let path = PathBuf::from(locator);
    (path.is_file() && is_audio_file(&path, settings)).then_some(path)
}
