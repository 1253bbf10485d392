//! Data-source model — immutable descriptions of candidate inputs and
//! their derivation history.
//!
//! A [`DataSource`] is created once (by the caller for top-level inputs, or
//! by the archive handler for extracted entries) and never mutated. Parent
//! links are `Arc`s, so sibling archive entries share their common ancestors
//! and the derivation chain of any source can be recovered without a global
//! registry.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Classification token for a byte source, e.g. `"zip"`, `"dcm"`, `"nii.gz"`.
///
/// Tokens are lowercase and compared exactly; the reader registry is keyed
/// by them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileType(String);

impl FileType {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().to_ascii_lowercase())
    }

    /// Classify a file by its name: the trailing extension, lowercased.
    ///
    /// A trailing `.gz` keeps the preceding extension so compressed formats
    /// such as `brain.nii.gz` classify as `nii.gz` rather than bare `gz`.
    /// Names without an extension classify as the empty token.
    pub fn for_name(name: &str) -> Self {
        let segments: Vec<&str> = name.rsplitn(3, '.').collect();
        let token = match segments.as_slice() {
            [last, prev, _rest] if last.eq_ignore_ascii_case("gz") => format!("{prev}.{last}"),
            [last, _rest @ ..] if segments.len() > 1 => (*last).to_string(),
            _ => String::new(),
        };
        Self::new(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this file type is a recognized archive container.
    pub fn is_archive(&self) -> bool {
        self.0 == "zip"
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw byte source: a display name, its classification, and the bytes.
///
/// Bytes are [`Bytes`] so archive children extracted from one buffer are
/// cheap to clone around the pipeline.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub name: String,
    pub file_type: FileType,
    pub bytes: Bytes,
}

impl FileSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let file_type = FileType::for_name(&name);
        Self {
            name,
            file_type,
            bytes: bytes.into(),
        }
    }

    pub fn with_type(name: impl Into<String>, file_type: FileType, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            file_type,
            bytes: bytes.into(),
        }
    }
}

/// Location of a byte source inside a parent archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    /// Directory path within the archive; empty string for root-level entries.
    pub path: String,
}

/// One candidate input: an optional byte source, an optional archive
/// location, and a back-reference to the source it was derived from.
///
/// A source with no parent is a true top-level input.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub file: Option<FileSource>,
    pub archive: Option<ArchiveSource>,
    pub parent: Option<Arc<DataSource>>,
}

impl DataSource {
    /// Wrap a raw file as a top-level input.
    pub fn from_file(file: FileSource) -> Arc<Self> {
        Arc::new(Self {
            file: Some(file),
            archive: None,
            parent: None,
        })
    }

    /// Derive a child source for one archive entry.
    pub fn archive_entry(
        file: FileSource,
        archive_path: String,
        parent: &Arc<DataSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            file: Some(file),
            archive: Some(ArchiveSource { path: archive_path }),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Best-effort name for user-facing messages.
    pub fn display_name(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("<unnamed input>")
    }

    /// The derivation chain from the original top-level input (first) down
    /// to this source (last). Read-only; used for error attribution.
    pub fn stack_trace(self: &Arc<Self>) -> Vec<Arc<DataSource>> {
        let mut chain = Vec::new();
        let mut cursor = Some(Arc::clone(self));
        while let Some(src) = cursor {
            cursor = src.parent.clone();
            chain.push(src);
        }
        chain.reverse();
        chain
    }
}
