//! Where referenced documents come from.
//!
//! The resolver reads `extends` targets through [`DocumentSource`]. The
//! filesystem implementation resolves relative references against an
//! optional base directory; the in-memory one backs tests and embedders.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies raw document bytes by reference.
pub trait DocumentSource {
    /// Read the document named by `reference` (the `file` field of an
    /// `extends` entry).
    fn read(&self, reference: &str) -> Result<Vec<u8>>;

    /// Canonical identity of `reference`, used to detect cycles.
    fn identity(&self, reference: &str) -> String {
        reference.to_string()
    }
}

/// Reads documents from disk.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    base_dir: Option<PathBuf>,
}

impl FsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative references against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Path a reference maps to on disk.
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl DocumentSource for FsSource {
    fn read(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve_path(reference);
        std::fs::read(&path).map_err(|e| Error::io(path, e))
    }

    fn identity(&self, reference: &str) -> String {
        let path = self.resolve_path(reference);
        std::fs::canonicalize(&path)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Documents held in memory, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, reference: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(reference, content);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.documents.insert(reference.into(), content.into());
    }
}

impl DocumentSource for MemorySource {
    fn read(&self, reference: &str) -> Result<Vec<u8>> {
        self.documents.get(reference).cloned().ok_or_else(|| {
            Error::io(
                reference,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }
}
