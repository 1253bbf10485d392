//! Per-input result model and success/failure partitioning.
//!
//! Every top-level input produces exactly one [`PipelineResult`]; a batch of
//! N inputs partitions into succeeded and errored lists that together hold
//! all N entries in their original relative order.

use crate::datasource::DataSource;
use crate::error::ImportError;
use crate::store::DataId;
use std::sync::Arc;

/// Kind of a successfully imported dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Image,
    Dicom,
    /// Reserved for the future model store; never loadable for display.
    Model,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Image => "image",
            DataType::Dicom => "dicom",
            DataType::Model => "model",
        }
    }
}

/// One successfully loaded dataset reference produced by a branch.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// Handle into the external dataset store.
    pub data_id: DataId,
    /// The source this dataset was imported from.
    pub data_source: Arc<DataSource>,
    pub data_type: DataType,
}

impl ImportResult {
    /// Whether this result can back an initial display (image or dicom).
    pub fn is_loadable(&self) -> bool {
        matches!(self.data_type, DataType::Image | DataType::Dicom)
    }
}

/// One failure inside a branch, attributed to the exact nested source that
/// failed.
#[derive(Debug)]
pub struct ErrorRecord {
    pub error: ImportError,
    /// Derivation chain from the original top-level input (first) to the
    /// failing source (last).
    pub stack_trace: Vec<Arc<DataSource>>,
}

impl ErrorRecord {
    pub fn new(error: ImportError, failing: &Arc<DataSource>) -> Self {
        Self {
            error,
            stack_trace: failing.stack_trace(),
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Display name of the innermost concretely-failing file.
    pub fn innermost_name(&self) -> &str {
        self.stack_trace
            .last()
            .map(|src| src.display_name())
            .unwrap_or("<unnamed input>")
    }
}

/// Successful outcome of one top-level branch.
#[derive(Debug)]
pub struct PipelineOk {
    pub data_source: Arc<DataSource>,
    /// Ordered results; may be empty (e.g. an archive of directories only).
    pub results: Vec<ImportResult>,
}

/// Failed outcome of one top-level branch.
#[derive(Debug)]
pub struct PipelineErr {
    pub data_source: Arc<DataSource>,
    /// At least one record; several when multiple archive entries failed.
    pub errors: Vec<ErrorRecord>,
}

/// Terminal outcome of one top-level input.
#[derive(Debug)]
pub enum PipelineResult {
    Ok(PipelineOk),
    Err(PipelineErr),
}

impl PipelineResult {
    pub fn data_source(&self) -> &Arc<DataSource> {
        match self {
            PipelineResult::Ok(ok) => &ok.data_source,
            PipelineResult::Err(err) => &err.data_source,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, PipelineResult::Ok(_))
    }
}

/// Split batch results into (succeeded, errored), preserving relative order
/// within each list. Total: every input lands in exactly one partition.
pub fn partition_results(results: Vec<PipelineResult>) -> (Vec<PipelineOk>, Vec<PipelineErr>) {
    let mut succeeded = Vec::new();
    let mut errored = Vec::new();
    for result in results {
        match result {
            PipelineResult::Ok(ok) => succeeded.push(ok),
            PipelineResult::Err(err) => errored.push(err),
        }
    }
    (succeeded, errored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::FileSource;

    fn source(name: &str) -> Arc<DataSource> {
        DataSource::from_file(FileSource::new(name, Vec::<u8>::new()))
    }

    fn ok(name: &str) -> PipelineResult {
        PipelineResult::Ok(PipelineOk {
            data_source: source(name),
            results: vec![],
        })
    }

    fn err(name: &str) -> PipelineResult {
        let src = source(name);
        PipelineResult::Err(PipelineErr {
            errors: vec![ErrorRecord::new(
                ImportError::MissingBytes {
                    name: name.to_string(),
                },
                &src,
            )],
            data_source: src,
        })
    }

    #[test]
    fn test_partition_is_total_and_order_preserving() {
        let batch = vec![ok("a"), err("b"), ok("c"), err("d"), ok("e")];
        let n = batch.len();
        let (succeeded, errored) = partition_results(batch);

        assert_eq!(succeeded.len() + errored.len(), n);
        let ok_names: Vec<&str> = succeeded.iter().map(|r| r.data_source.display_name()).collect();
        let err_names: Vec<&str> = errored.iter().map(|r| r.data_source.display_name()).collect();
        assert_eq!(ok_names, vec!["a", "c", "e"]);
        assert_eq!(err_names, vec!["b", "d"]);
    }

    #[test]
    fn test_partition_is_idempotent() {
        let (succeeded, errored) = partition_results(vec![ok("a"), err("b"), ok("c")]);

        // Re-partitioning the concatenation reproduces both lists exactly.
        let recombined: Vec<PipelineResult> = succeeded
            .into_iter()
            .map(PipelineResult::Ok)
            .chain(errored.into_iter().map(PipelineResult::Err))
            .collect();
        let (s2, e2) = partition_results(recombined);
        let ok_names: Vec<&str> = s2.iter().map(|r| r.data_source.display_name()).collect();
        let err_names: Vec<&str> = e2.iter().map(|r| r.data_source.display_name()).collect();
        assert_eq!(ok_names, vec!["a", "c"]);
        assert_eq!(err_names, vec!["b"]);
    }

    #[test]
    fn test_error_record_names_innermost_file() {
        let top = source("outer.zip");
        let child = DataSource::archive_entry(
            FileSource::new("bad.dcm", Vec::<u8>::new()),
            "series".to_string(),
            &top,
        );
        let record = ErrorRecord::new(
            ImportError::MissingBytes {
                name: "bad.dcm".into(),
            },
            &child,
        );
        assert_eq!(record.innermost_name(), "bad.dcm");
        assert_eq!(record.stack_trace.len(), 2);
        assert_eq!(record.stack_trace[0].display_name(), "outer.zip");
    }

    #[test]
    fn test_loadable_kinds() {
        let src = source("x");
        let store = crate::store::DatasetStore::new();
        let id = store.register_image(crate::store::ImageBlob {
            name: "x".into(),
            data: bytes::Bytes::new(),
        });
        for (ty, loadable) in [
            (DataType::Image, true),
            (DataType::Dicom, true),
            (DataType::Model, false),
        ] {
            let result = ImportResult {
                data_id: id,
                data_source: Arc::clone(&src),
                data_type: ty,
            };
            assert_eq!(result.is_loadable(), loadable);
        }
    }
}
