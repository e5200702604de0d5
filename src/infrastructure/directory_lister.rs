//! Default `DirectoryLister`, backed by `walkdir`.

use crate::domain::ports::DirectoryLister;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct WalkdirLister;

impl WalkdirLister {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WalkdirLister {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryLister for WalkdirLister {
    fn list_recursive(&self, root: &Path) -> std::io::Result<Vec<PathBuf>> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            if entry.file_type().is_file() {
                out.push(entry.into_path());
            }
        }
        Ok(out)
    }
}
