//! Generic chain-of-responsibility engine driving each input through the
//! ordered import handlers.
//!
//! Every top-level input is an independent branch. Handlers run strictly in
//! registration order within a branch; the first handler that reports
//! [`Handled::Done`] terminates the branch successfully, an error terminates
//! it as a failure, and [`Handled::Expand`] re-enters the whole chain for
//! each derived child, merging all descendant outcomes into the one
//! top-level [`PipelineResult`]. Branches share no mutable state, so a
//! failure in one can never disturb another.

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::datasource::DataSource;
use crate::error::ImportError;
use crate::result::{ErrorRecord, ImportResult, PipelineErr, PipelineOk, PipelineResult};

/// Outcome of one handler applied to one data source.
///
/// Termination and fan-out are explicit variants rather than side-effecting
/// callbacks, so the engine (and the type system) can see exactly how a
/// branch progresses.
#[derive(Debug)]
pub enum Handled {
    /// Terminate this branch successfully with its results.
    Done(Vec<ImportResult>),
    /// Advance to the next handler with a possibly-transformed source.
    Continue(Arc<DataSource>),
    /// Re-enter the whole chain for each derived child and merge their
    /// terminal outcomes. An empty list is a vacuous success.
    Expand(Vec<Arc<DataSource>>),
}

/// One pipeline step.
#[async_trait]
pub trait ImportHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Inspect one source and decide how its branch proceeds.
    async fn handle(&self, source: &Arc<DataSource>) -> Result<Handled, ImportError>;
}

/// Merged results and failures of one branch subtree.
#[derive(Default)]
struct BranchOutcome {
    results: Vec<ImportResult>,
    errors: Vec<ErrorRecord>,
}

/// Ordered handler chain plus the batch executor.
pub struct Pipeline {
    handlers: Vec<Arc<dyn ImportHandler>>,
}

impl Pipeline {
    pub fn new(handlers: Vec<Arc<dyn ImportHandler>>) -> Self {
        Self { handlers }
    }

    /// Run one top-level input to its terminal result.
    ///
    /// A branch whose subtree produced any error record is classified as a
    /// failure carrying every record; otherwise it succeeds with the merged,
    /// ordered results (possibly zero of them).
    pub async fn run(&self, input: Arc<DataSource>) -> PipelineResult {
        let outcome = self.drive(Arc::clone(&input)).await;
        if outcome.errors.is_empty() {
            PipelineResult::Ok(PipelineOk {
                data_source: input,
                results: outcome.results,
            })
        } else {
            PipelineResult::Err(PipelineErr {
                data_source: input,
                errors: outcome.errors,
            })
        }
    }

    /// Run all top-level inputs concurrently and join on every branch.
    ///
    /// Output order equals input order regardless of completion timing; no
    /// branch is cancelled or retried because a sibling failed.
    pub async fn run_all(&self, inputs: Vec<Arc<DataSource>>) -> Vec<PipelineResult> {
        join_all(inputs.into_iter().map(|input| self.run(input))).await
    }

    /// Walk one source through the chain, recursing into fan-out children.
    fn drive(&self, source: Arc<DataSource>) -> BoxFuture<'_, BranchOutcome> {
        async move {
            let mut current = source;
            for handler in &self.handlers {
                debug!(
                    handler = handler.name(),
                    source = current.display_name(),
                    "dispatching handler"
                );
                match handler.handle(&current).await {
                    Ok(Handled::Done(results)) => {
                        return BranchOutcome {
                            results,
                            errors: Vec::new(),
                        };
                    }
                    Ok(Handled::Continue(next)) => current = next,
                    Ok(Handled::Expand(children)) => {
                        let outcomes =
                            join_all(children.into_iter().map(|child| self.drive(child))).await;
                        let mut merged = BranchOutcome::default();
                        for outcome in outcomes {
                            merged.results.extend(outcome.results);
                            merged.errors.extend(outcome.errors);
                        }
                        return merged;
                    }
                    Err(error) => {
                        warn!(
                            handler = handler.name(),
                            source = current.display_name(),
                            %error,
                            "handler failed; terminating branch"
                        );
                        return BranchOutcome {
                            results: Vec::new(),
                            errors: vec![ErrorRecord::new(error, &current)],
                        };
                    }
                }
            }
            // Chain exhausted without a terminal handler: unrecognized
            // input, which is a vacuous success, not an error.
            BranchOutcome::default()
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{FileSource, FileType};
    use crate::result::{partition_results, DataType};
    use crate::store::{DatasetStore, ImageBlob};

    fn source(name: &str) -> Arc<DataSource> {
        DataSource::from_file(FileSource::new(name, Vec::<u8>::new()))
    }

    /// Terminates `.img` sources with one registered image result.
    struct TerminalHandler {
        store: Arc<DatasetStore>,
    }

    #[async_trait]
    impl ImportHandler for TerminalHandler {
        fn name(&self) -> &str {
            "terminal"
        }

        async fn handle(&self, src: &Arc<DataSource>) -> Result<Handled, ImportError> {
            let file = src.file.as_ref().expect("test sources carry files");
            if file.file_type != FileType::new("img") {
                return Ok(Handled::Continue(Arc::clone(src)));
            }
            let data_id = self.store.register_image(ImageBlob {
                name: file.name.clone(),
                data: file.bytes.clone(),
            });
            Ok(Handled::Done(vec![ImportResult {
                data_id,
                data_source: Arc::clone(src),
                data_type: DataType::Image,
            }]))
        }
    }

    /// Fans `.many` sources out into three `.img` children.
    struct FanOutHandler;

    #[async_trait]
    impl ImportHandler for FanOutHandler {
        fn name(&self) -> &str {
            "fan_out"
        }

        async fn handle(&self, src: &Arc<DataSource>) -> Result<Handled, ImportError> {
            let file = src.file.as_ref().expect("test sources carry files");
            if file.file_type != FileType::new("many") {
                return Ok(Handled::Continue(Arc::clone(src)));
            }
            let children = (0..3)
                .map(|i| {
                    DataSource::archive_entry(
                        FileSource::new(format!("child{i}.img"), Vec::<u8>::new()),
                        String::new(),
                        src,
                    )
                })
                .collect();
            Ok(Handled::Expand(children))
        }
    }

    /// Fails every `.bad` source.
    struct FailingHandler;

    #[async_trait]
    impl ImportHandler for FailingHandler {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(&self, src: &Arc<DataSource>) -> Result<Handled, ImportError> {
            let file = src.file.as_ref().expect("test sources carry files");
            if file.file_type == FileType::new("bad") {
                return Err(ImportError::MissingBytes {
                    name: file.name.clone(),
                });
            }
            Ok(Handled::Continue(Arc::clone(src)))
        }
    }

    fn pipeline(store: &Arc<DatasetStore>) -> Pipeline {
        Pipeline::new(vec![
            Arc::new(FanOutHandler),
            Arc::new(FailingHandler),
            Arc::new(TerminalHandler {
                store: Arc::clone(store),
            }),
        ])
    }

    #[tokio::test]
    async fn test_first_done_terminates_branch() {
        let store = Arc::new(DatasetStore::new());
        let result = pipeline(&store).run(source("scan.img")).await;
        match result {
            PipelineResult::Ok(ok) => {
                assert_eq!(ok.results.len(), 1);
                assert_eq!(ok.results[0].data_type, DataType::Image);
            }
            PipelineResult::Err(_) => panic!("expected success"),
        }
    }

    #[tokio::test]
    async fn test_chain_exhaustion_is_vacuous_success() {
        let store = Arc::new(DatasetStore::new());
        let result = pipeline(&store).run(source("notes.txt")).await;
        match result {
            PipelineResult::Ok(ok) => assert!(ok.results.is_empty()),
            PipelineResult::Err(_) => panic!("unrecognized input must not error"),
        }
    }

    #[tokio::test]
    async fn test_fan_out_merges_children_into_top_level() {
        let store = Arc::new(DatasetStore::new());
        let result = pipeline(&store).run(source("batch.many")).await;
        match result {
            PipelineResult::Ok(ok) => {
                assert_eq!(ok.results.len(), 3);
                assert_eq!(ok.data_source.display_name(), "batch.many");
                // Children re-entered the chain from the top and kept their
                // derivation links.
                for r in &ok.results {
                    let trace = r.data_source.stack_trace();
                    assert_eq!(trace[0].display_name(), "batch.many");
                }
            }
            PipelineResult::Err(_) => panic!("expected success"),
        }
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_branch_isolation() {
        let store = Arc::new(DatasetStore::new());
        let batch = vec![source("a.img"), source("boom.bad"), source("c.img")];
        let results = pipeline(&store).run_all(batch).await;

        assert_eq!(results.len(), 3);
        let (succeeded, errored) = partition_results(results);
        assert_eq!(succeeded.len(), 2);
        assert_eq!(errored.len(), 1);
        assert_eq!(errored[0].data_source.display_name(), "boom.bad");
        assert_eq!(errored[0].errors[0].stack_trace.len(), 1);
    }

    #[tokio::test]
    async fn test_run_all_preserves_input_order() {
        let store = Arc::new(DatasetStore::new());
        let names = ["z.img", "a.txt", "m.img"];
        let results = pipeline(&store)
            .run_all(names.iter().map(|n| source(n)).collect())
            .await;
        let out: Vec<&str> = results
            .iter()
            .map(|r| r.data_source().display_name())
            .collect();
        assert_eq!(out, names);
    }
}
