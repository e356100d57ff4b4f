//! Cheap "is this model directory populated" heuristic.
//!
//! Only marker files and weight extensions are looked at. Truncated or
//! partially downloaded shards still count as available.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::ModelEntry;

pub const MARKER_FILES: [&str; 2] = ["config.json", "model_config.json"];
pub const WEIGHT_EXTENSIONS: [&str; 2] = ["bin", "safetensors"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub name: String,
    pub path: PathBuf,
    pub available: bool,
}

pub fn is_available(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    if MARKER_FILES.iter().any(|marker| path.join(marker).exists()) {
        return true;
    }

    has_weight_file(path)
}

fn has_weight_file(path: &Path) -> bool {
    let Ok(entries) = fs::read_dir(path) else {
        return false;
    };

    entries.filter_map(|e| e.ok()).any(|entry| {
        let file = entry.path();
        file.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| WEIGHT_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    })
}

pub fn check(name: impl Into<String>, path: impl Into<PathBuf>) -> AvailabilityResult {
    let path = path.into();
    let available = is_available(&path);
    tracing::debug!(path = %path.display(), available, "checked model directory");
    AvailabilityResult {
        name: name.into(),
        path,
        available,
    }
}

/// Check every entry, keeping input order.
pub fn scan(entries: &[ModelEntry]) -> Vec<AvailabilityResult> {
    entries
        .iter()
        .map(|entry| check(entry.id.display_name(), entry.local_path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve_in, ModelSource};
    use tempfile::TempDir;

    #[test]
    fn missing_path_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        assert!(!is_available(&tmp.path().join("nope")));
    }

    #[test]
    fn empty_dir_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        assert!(!is_available(tmp.path()));
    }

    #[test]
    fn config_marker_is_enough() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), "{}").unwrap();
        assert!(is_available(tmp.path()));
    }

    #[test]
    fn model_config_marker_is_enough() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("model_config.json"), "{}").unwrap();
        assert!(is_available(tmp.path()));
    }

    #[test]
    fn weights_alone_are_enough() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("weights.safetensors"), b"").unwrap();
        assert!(is_available(tmp.path()));

        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("llm.bin"), b"x").unwrap();
        assert!(is_available(tmp.path()));
    }

    #[test]
    fn unrelated_files_do_not_count() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("README.md"), "hi").unwrap();
        fs::write(tmp.path().join("flow.pt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("config.json"), "{}").unwrap();
        assert!(!is_available(tmp.path()));
    }

    #[test]
    fn scan_reports_each_entry_in_order() {
        let tmp = TempDir::new().unwrap();
        let entries = resolve_in(ModelSource::ModelScope, tmp.path());
        fs::create_dir_all(&entries[1].local_path).unwrap();
        fs::write(entries[1].local_path.join("config.json"), "{}").unwrap();

        let results = scan(&entries);
        assert_eq!(results.len(), entries.len());
        assert_eq!(results[0].name, "Fun-CosyVoice3-0.5B");
        assert!(!results[0].available);
        assert!(results[1].available);
        assert_eq!(results.iter().filter(|r| r.available).count(), 1);
    }
}
