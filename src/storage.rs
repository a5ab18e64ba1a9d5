// SPDX-License-Identifier: GPL-3.0-only

//! Storage helpers for saved strips

use std::path::{Path, PathBuf};
use tracing::debug;

/// Default folder name under the pictures directory
pub const DEFAULT_SAVE_FOLDER: &str = "PhotoBooth";

/// Directory strips are saved into
pub fn strip_directory(folder: &str) -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folder)
}

/// Timestamped, collision-free path for a new strip
pub fn unique_strip_path(dir: &Path, extension: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let mut path = dir.join(format!("STRIP_{}.{}", timestamp, extension));

    // Two saves inside the same second must not clobber each other
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("STRIP_{}_{}.{}", timestamp, counter, extension));
        counter += 1;
    }
    path
}

/// Most recently modified strip in the directory, if any
pub fn latest_strip(dir: &Path) -> Option<PathBuf> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        let Some(ext) = path.extension() else {
            continue;
        };
        let ext = ext.to_string_lossy();
        if !ext.eq_ignore_ascii_case("png") && !ext.eq_ignore_ascii_case("jpg") {
            continue;
        }

        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    let (_, path) = newest?;
    debug!(path = %path.display(), "Found latest strip");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_strip_path_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_strip_path(dir.path(), "png");
        std::fs::write(&first, b"x").unwrap();

        let second = unique_strip_path(dir.path(), "png");
        assert_ne!(first, second);
    }

    #[test]
    fn test_latest_strip_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        assert!(latest_strip(dir.path()).is_none());

        let strip = dir.path().join("STRIP_20260101_000000.png");
        std::fs::write(&strip, b"x").unwrap();
        assert_eq!(latest_strip(dir.path()), Some(strip));
    }

    #[test]
    fn test_latest_strip_missing_directory() {
        assert!(latest_strip(Path::new("/nonexistent/booth")).is_none());
    }
}
