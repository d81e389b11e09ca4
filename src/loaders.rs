//! Resource loading utilities
//!
//! This module reads schema documents from disk for the registry.

use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fs;
use std::path::{Path, PathBuf};

/// Tab characters are normalized to this many spaces before parsing
pub const TAB_WIDTH: usize = 8;

/// Resource loader for schema files
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a schema file, with tabs expanded
    pub fn load(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read '{}': {}", path.display(), e),
            ))
        })?;

        self.limits.check_schema_size(content.len())?;

        Ok(content.replace('\t', &" ".repeat(TAB_WIDTH)))
    }

    /// Regular files directly inside `dir`, in sorted order
    pub fn schema_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
