//! Caller-facing import API — wraps files into data sources, runs the
//! batch, surfaces aggregate failures, and activates the primary dataset.

use std::sync::Arc;
use tracing::info;

use crate::config::ImportConfig;
use crate::datasource::{DataSource, FileSource};
use crate::handlers::{ExtractArchiveHandler, ImportSingleFileHandler};
use crate::pipeline::Pipeline;
use crate::reader::ReaderRegistry;
use crate::result::{partition_results, PipelineErr, PipelineResult};
use crate::select::{find_base_dataset, loadable_results};
use crate::state::LoadingStatus;
use crate::store::{DataId, DatasetStore};

/// Build the one aggregate error surfaced after a batch with failures:
/// one `- <innermost file>: <message>` line per errored top-level input.
fn aggregate_error(errored: &[PipelineErr]) -> anyhow::Error {
    let lines: Vec<String> = errored
        .iter()
        .map(|err| {
            let first = &err.errors[0];
            format!("- {}: {}", first.innermost_name(), first.message())
        })
        .collect();
    anyhow::anyhow!(lines.join("\n"))
}

/// Drives batch imports end to end: archive expansion, reader dispatch,
/// partitioning, aggregate error reporting, and primary selection.
pub struct Importer {
    pipeline: Pipeline,
    store: Arc<DatasetStore>,
    loading: Arc<dyn LoadingStatus>,
    config: ImportConfig,
}

impl Importer {
    pub fn new(
        registry: Arc<ReaderRegistry>,
        store: Arc<DatasetStore>,
        loading: Arc<dyn LoadingStatus>,
        config: ImportConfig,
    ) -> Self {
        let pipeline = Pipeline::new(vec![
            Arc::new(ExtractArchiveHandler),
            Arc::new(ImportSingleFileHandler::new(registry, Arc::clone(&store))),
        ]);
        Self {
            pipeline,
            store,
            loading,
            config,
        }
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    /// Run a batch of already-wrapped data sources to terminal results.
    pub async fn import_data_sources(
        &self,
        sources: Vec<Arc<DataSource>>,
    ) -> Vec<PipelineResult> {
        self.pipeline.run_all(sources).await
    }

    /// Wrap raw files as top-level inputs, import them, report failures to
    /// the loading coordinator, and make the heuristically chosen primary
    /// dataset the store's active selection.
    ///
    /// Returns the primary dataset's id, if any loadable dataset arrived. A
    /// batch with failed inputs still selects a primary from the successes.
    pub async fn load_files(&self, files: Vec<FileSource>) -> Option<DataId> {
        let sources: Vec<Arc<DataSource>> =
            files.into_iter().map(DataSource::from_file).collect();

        self.loading.start_loading();
        let results = self.import_data_sources(sources).await;
        let (succeeded, errored) = partition_results(results);
        info!(
            succeeded = succeeded.len(),
            errored = errored.len(),
            "batch import finished"
        );

        if !errored.is_empty() {
            self.loading.set_error(aggregate_error(&errored));
        }

        let loadable = loadable_results(&succeeded);
        let primary = find_base_dataset(
            &loadable,
            &self.store,
            &self.config.modality_priorities,
            &self.config.segment_group_extension,
        )
        .map(|result| result.data_id);

        if let Some(id) = primary {
            self.store.set_active(id);
        }
        self.loading.stop_loading();
        primary
    }
}
