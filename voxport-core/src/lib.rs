//! # Voxport Core
//!
//! Import pipeline for heterogeneous scientific-imaging inputs.
//! Wraps files (including nested archives) as data sources, drives each one
//! through an ordered handler chain on its own isolated branch, partitions
//! the per-input outcomes, and selects the primary dataset for initial
//! display. Pixel decoding is delegated to registered format readers.

pub mod config;
pub mod datasource;
pub mod error;
pub mod handlers;
pub mod importer;
pub mod pipeline;
pub mod reader;
pub mod result;
pub mod select;
pub mod state;
pub mod store;
pub mod view_config;

// Re-export commonly used types at the crate root.
pub use config::ImportConfig;
pub use datasource::{ArchiveSource, DataSource, FileSource, FileType};
pub use error::{ImportError, Result};
pub use handlers::{ExtractArchiveHandler, ImportSingleFileHandler};
pub use importer::Importer;
pub use pipeline::{Handled, ImportHandler, Pipeline};
pub use reader::{FormatReader, ReaderRegistry};
pub use result::{
    partition_results, DataType, ErrorRecord, ImportResult, PipelineErr, PipelineOk,
    PipelineResult,
};
pub use select::{find_base_dataset, is_segmentation_name, loadable_results};
pub use state::{LoadingStatus, LoadingTracker, NoOpLoading};
pub use store::{
    DataId, DatasetStore, DecodedDataset, DicomMeta, DicomSeries, ImageBlob, MeshBlob,
};
pub use view_config::{ViewConfig, ViewConfigRegistry};
