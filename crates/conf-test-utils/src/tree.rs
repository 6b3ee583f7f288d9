//! [`TestTree`] builder for configuration resource scenarios.

use conf_fs::NormalizedPath;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory tree holding configuration resources.
///
/// # Example
///
/// ```rust
/// use conf_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// let etc = tree.dir("etc");
/// tree.write("etc/app.ini", "[app]\nkey = value\n");
/// tree.assert_file_contains("etc/app.ini", "key = value");
/// assert!(etc.ends_with("etc"));
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create `rel` (and its parents) under the root and return its path.
    pub fn dir(&self, rel: &str) -> PathBuf {
        let dir = self.root().join(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> NormalizedPath {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        NormalizedPath::new(path)
    }

    /// Normalized path of `rel` under the root, whether or not it exists.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        NormalizedPath::new(self.root().join(rel))
    }

    /// Read `rel` as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let full_path = self.root().join(rel);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.root().join(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}
