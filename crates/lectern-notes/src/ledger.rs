//! Processed-items ledger: one item key per line

use crate::error::NotesError;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Set of item keys already analyzed, backed by an append-only file
#[derive(Debug, Clone)]
pub struct ProcessedLedger {
    path: PathBuf,
    keys: HashSet<String>,
}

impl ProcessedLedger {
    /// Load the ledger; a missing file is an empty ledger
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, NotesError> {
        let path = path.into();
        let keys = match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(NotesError::io(&path, e)),
        };
        Ok(Self { path, keys })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `key` was processed
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of processed keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing was processed yet
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Mark `key` as processed, appending it to the file once
    pub fn record(&mut self, key: &str) -> Result<(), NotesError> {
        if !self.keys.insert(key.to_string()) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| NotesError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| NotesError::io(&self.path, e))?;
        writeln!(file, "{}", key).map_err(|e| NotesError::io(&self.path, e))
    }
}
