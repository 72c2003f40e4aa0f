use std::fs;

use tempfile::TempDir;

/// Create a temporary directory populated with `(relative path, contents)`
/// pairs. Parent directories are created as needed.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for (path, contents) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&full, contents).expect("Failed to write fixture file");
    }
    dir
}
