//! Durable round-trip helpers for the memory resources.
//!
//! All writes are whole-resource overwrites, so a partial write is the only
//! corruption risk: content goes to a temp file first and is renamed into
//! place, which keeps every replacement all-or-nothing.

use driftmind_core::MemoryError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::warn;

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| MemoryError::Storage(format!("Failed to create {}: {e}", parent.display())))?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| MemoryError::Serialization(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)
        .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| MemoryError::Storage(format!("Failed to replace {}: {e}", path.display())))?;

    Ok(())
}

/// Read a JSON resource, degrading to the default on any failure.
///
/// A missing file means a fresh install; unreadable or corrupted content is
/// logged and treated the same way. Neither is fatal.
pub(crate) fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return T::default(),
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping corrupted memory resource");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("list.json");

        write_json_atomic(&path, &vec!["a".to_string(), "b".to_string()]).unwrap();
        let back: Vec<String> = read_json_or_default(&path);
        assert_eq!(back, vec!["a", "b"]);

        // No temp file left behind
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_reads_as_default() {
        let back: Vec<String> = read_json_or_default(Path::new("/nonexistent/list.json"));
        assert!(back.is_empty());
    }

    #[test]
    fn corrupted_file_reads_as_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "this is not json").unwrap();

        let back: Vec<String> = read_json_or_default(&path);
        assert!(back.is_empty());
    }

    #[test]
    fn overwrite_replaces_whole_resource() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("list.json");

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_json_atomic(&path, &vec![9]).unwrap();
        let back: Vec<i32> = read_json_or_default(&path);
        assert_eq!(back, vec![9]);
    }
}
