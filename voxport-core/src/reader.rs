//! Format-reader registry — maps file-type tokens to decode collaborators.
//!
//! Readers are registered at startup and can be added or removed at runtime.
//! The registry is consulted per file by the single-file import handler; an
//! absent entry is a legitimate "cannot handle" signal, not an error. The
//! core never decodes pixel data itself.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::datasource::{FileSource, FileType};
use crate::error::ImportError;
use crate::store::DecodedDataset;

/// Trait implemented by format-reader collaborators.
///
/// Readers return `anyhow::Result` so any external decoder's error type
/// propagates unmodified as the branch failure cause.
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// The file-type token this reader handles, e.g. `"dcm"` or `"nii.gz"`.
    fn file_type(&self) -> FileType;

    /// Decode one byte source into a dataset.
    async fn read(&self, file: &FileSource) -> anyhow::Result<DecodedDataset>;
}

/// Registry of format readers keyed by file type.
pub struct ReaderRegistry {
    readers: HashMap<FileType, Arc<dyn FormatReader>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }

    /// Register a reader. Returns an error if its file type is taken.
    pub fn register(&mut self, reader: Arc<dyn FormatReader>) -> Result<(), ImportError> {
        let file_type = reader.file_type();
        if self.readers.contains_key(&file_type) {
            return Err(ImportError::ReaderAlreadyRegistered {
                file_type: file_type.to_string(),
            });
        }
        debug!(%file_type, "registering format reader");
        self.readers.insert(file_type, reader);
        Ok(())
    }

    /// Unregister the reader for a file type.
    pub fn unregister(&mut self, file_type: &FileType) -> Result<(), ImportError> {
        if self.readers.remove(file_type).is_none() {
            return Err(ImportError::ReaderNotFound {
                file_type: file_type.to_string(),
            });
        }
        debug!(%file_type, "unregistered format reader");
        Ok(())
    }

    /// Look up the reader for a file type, if any.
    pub fn get(&self, file_type: &FileType) -> Option<Arc<dyn FormatReader>> {
        self.readers.get(file_type).cloned()
    }

    /// All registered file-type tokens.
    pub fn list_types(&self) -> Vec<FileType> {
        self.readers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
