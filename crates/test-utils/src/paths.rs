//! Path utilities for test data and scratch directories.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns the workspace root directory.
///
/// Walks up from the test-utils manifest dir (`crates/test-utils`).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns `config/` at the workspace root.
pub fn config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// Creates a fresh temporary directory. Removed when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Writes `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    fs::write(&path, contents).expect("failed to write test file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_write_file_nested() {
        let dir = temp_dir();
        let path = write_file(dir.path(), "a/b/c.txt", "hello");
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }
}
