//! Single-file import — dispatches a byte source to its format reader and
//! registers the decoded dataset(s) with the external store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::datasource::DataSource;
use crate::error::ImportError;
use crate::pipeline::{Handled, ImportHandler};
use crate::reader::ReaderRegistry;
use crate::result::{DataType, ImportResult};
use crate::store::{DatasetStore, DecodedDataset};

/// Looks up the reader registered for the source's file type. No reader is
/// a legitimate "cannot handle": the source passes through unchanged for a
/// later handler (or the unrecognized terminal state). A found reader
/// terminates the branch with one [`ImportResult`] per registered dataset.
pub struct ImportSingleFileHandler {
    registry: Arc<ReaderRegistry>,
    store: Arc<DatasetStore>,
}

impl ImportSingleFileHandler {
    pub fn new(registry: Arc<ReaderRegistry>, store: Arc<DatasetStore>) -> Self {
        Self { registry, store }
    }
}

#[async_trait]
impl ImportHandler for ImportSingleFileHandler {
    fn name(&self) -> &str {
        "import_single_file"
    }

    async fn handle(&self, source: &Arc<DataSource>) -> Result<Handled, ImportError> {
        let Some(file) = &source.file else {
            return Ok(Handled::Continue(Arc::clone(source)));
        };
        let Some(reader) = self.registry.get(&file.file_type) else {
            return Ok(Handled::Continue(Arc::clone(source)));
        };

        debug!(name = %file.name, file_type = %file.file_type, "decoding file");
        let decoded = reader
            .read(file)
            .await
            .map_err(|cause| ImportError::Reader {
                name: file.name.clone(),
                cause,
            })?;

        let results = match decoded {
            DecodedDataset::Image(image) => {
                let data_id = self.store.register_image(image);
                vec![ImportResult {
                    data_id,
                    data_source: Arc::clone(source),
                    data_type: DataType::Image,
                }]
            }
            DecodedDataset::Dicom(series) => series
                .into_iter()
                .map(|s| ImportResult {
                    data_id: self.store.register_dicom(s),
                    data_source: Arc::clone(source),
                    data_type: DataType::Dicom,
                })
                .collect(),
            // No model store exists yet.
            other @ DecodedDataset::Mesh(_) => {
                return Err(ImportError::UnsupportedKind {
                    name: file.name.clone(),
                    kind: other.kind().to_string(),
                });
            }
        };
        Ok(Handled::Done(results))
    }
}
