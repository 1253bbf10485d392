//! Archive expansion — turns one zip data source into its child sources.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::debug;

use crate::datasource::{DataSource, FileSource};
use crate::error::ImportError;
use crate::pipeline::{Handled, ImportHandler};

/// Expands recognized archive containers into one child [`DataSource`] per
/// non-directory entry, in the archive's own enumeration order. Each child
/// carries its basename, the directory path locating it inside the archive,
/// its own bytes, and a parent link to the originating source. Non-archive
/// sources pass through unchanged.
pub struct ExtractArchiveHandler;

impl ExtractArchiveHandler {
    fn expand(source: &Arc<DataSource>, file: &FileSource) -> Result<Vec<Arc<DataSource>>, ImportError> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(file.bytes.clone())).map_err(|e| {
                ImportError::ArchiveOpen {
                    name: file.name.clone(),
                    message: e.to_string(),
                }
            })?;

        let mut children = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| ImportError::ArchiveOpen {
                name: file.name.clone(),
                message: e.to_string(),
            })?;
            if entry.is_dir() {
                continue;
            }

            let entry_name = entry.name().to_string();
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .map_err(|e| ImportError::ArchiveEntry {
                    name: file.name.clone(),
                    entry: entry_name.clone(),
                    message: e.to_string(),
                })?;

            // Zip entry names always use forward slashes.
            let (dir_path, basename) = match entry_name.rsplit_once('/') {
                Some((dir, base)) => (dir.to_string(), base.to_string()),
                None => (String::new(), entry_name),
            };
            children.push(DataSource::archive_entry(
                FileSource::new(basename, Bytes::from(buf)),
                dir_path,
                source,
            ));
        }
        debug!(
            archive = %file.name,
            entries = children.len(),
            "expanded archive"
        );
        Ok(children)
    }
}

#[async_trait]
impl ImportHandler for ExtractArchiveHandler {
    fn name(&self) -> &str {
        "extract_archive"
    }

    async fn handle(&self, source: &Arc<DataSource>) -> Result<Handled, ImportError> {
        match &source.file {
            Some(file) if file.file_type.is_archive() => {
                Ok(Handled::Expand(Self::expand(source, file)?))
            }
            _ => Ok(Handled::Continue(Arc::clone(source))),
        }
    }
}
