//! Configuration resource location lookup
//!
//! A location hint such as `app.ini` is searched, in precedence order, in:
//!
//! 1. The directory named by the `CONF_DIR` environment variable
//! 2. Conventional directories (`/etc`, `/usr/local/etc`, platform config dir, `~/.config`)
//! 3. The current working directory
//! 4. The hint itself, when it is an absolute path

use crate::constants::{CONF_DIR_ENV, ConventionalDir};
use crate::{Error, NormalizedPath, Result};
use std::path::PathBuf;

/// Searches well-known directories for configuration resources.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    /// Directories in precedence order (highest first)
    dirs: Vec<PathBuf>,
}

impl Locator {
    /// Create a locator that searches nothing but absolute hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a locator with the standard search order for this process.
    pub fn from_env() -> Self {
        let env_dir = std::env::var_os(CONF_DIR_ENV).map(PathBuf::from);
        let cwd = std::env::current_dir().ok();
        Self::standard(env_dir, cwd)
    }

    /// Build the standard search order from explicit inputs.
    ///
    /// Useful for testing, where the environment must not leak in.
    pub fn standard(env_dir: Option<PathBuf>, cwd: Option<PathBuf>) -> Self {
        let mut locator = Self::new();
        if let Some(dir) = env_dir {
            locator = locator.with_dir(dir);
        }
        for conventional in ConventionalDir::ALL {
            if let Some(dir) = conventional.path() {
                locator = locator.with_dir(dir);
            }
        }
        if let Some(dir) = cwd {
            locator = locator.with_dir(dir);
        }
        locator
    }

    /// Append a directory with lower precedence than those already present.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
        self
    }

    /// Directories searched, highest precedence first.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// All existing candidates for `hint`, highest precedence first.
    pub fn locate_all(&self, hint: &str) -> Vec<NormalizedPath> {
        let mut found: Vec<NormalizedPath> = Vec::new();
        let hint_path = NormalizedPath::new(hint);

        if !hint_path.is_absolute() {
            for dir in &self.dirs {
                let candidate = dir.join(hint);
                if candidate.is_file() {
                    let canonical = dunce::canonicalize(&candidate).unwrap_or(candidate);
                    push_unique(&mut found, NormalizedPath::new(canonical));
                }
            }
        } else if hint_path.is_file() {
            push_unique(&mut found, hint_path);
        }

        tracing::debug!(hint, candidates = found.len(), "Located configuration resources");
        found
    }

    /// The highest-precedence existing candidate for `hint`.
    pub fn locate(&self, hint: &str) -> Result<NormalizedPath> {
        self.locate_all(hint)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                hint: hint.to_string(),
            })
    }
}

fn push_unique(found: &mut Vec<NormalizedPath>, path: NormalizedPath) {
    if !found.contains(&path) {
        found.push(path);
    }
}
