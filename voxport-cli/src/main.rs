//! Voxport CLI — batch-import files and report what loaded.
//!
//! Registers opaque pass-through readers for common imaging extensions (no
//! pixel decoding happens here), runs the import pipeline over the given
//! files, and prints per-input outcomes, nested failure provenance, and the
//! selected primary dataset.

mod readers;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use voxport_core::{
    find_base_dataset, loadable_results, partition_results, DataSource, DatasetStore, FileSource,
    ImportConfig, Importer, LoadingTracker, PipelineErr, PipelineOk,
};

/// Voxport: batch importer for scientific-imaging datasets
#[derive(Parser, Debug)]
#[command(name = "voxport", version, about, long_about = None)]
struct Cli {
    /// Files to import (archives are expanded recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the segmentation naming extension (e.g. "seg")
    #[arg(long)]
    segment_extension: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_success(ok: &PipelineOk, store: &DatasetStore) {
    if ok.results.is_empty() {
        println!("  {} (no recognized datasets)", ok.data_source.display_name());
        return;
    }
    for result in &ok.results {
        let name = store
            .name_of(result.data_id)
            .unwrap_or_else(|| result.data_source.display_name().to_string());
        println!(
            "  {} [{}] -> {}",
            name,
            result.data_type.as_str(),
            result.data_id
        );
    }
}

fn print_failure(err: &PipelineErr) {
    println!("  {}", err.data_source.display_name());
    for record in &err.errors {
        let chain: Vec<&str> = record
            .stack_trace
            .iter()
            .map(|src| src.display_name())
            .collect();
        println!("    {} ({})", record.message(), chain.join(" > "));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ImportConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("could not load configuration: {e}"))?;
    if let Some(ext) = cli.segment_extension {
        config.segment_group_extension = ext;
    }

    let mut files = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(FileSource::new(name, bytes));
    }
    let total = files.len();

    let store = Arc::new(DatasetStore::new());
    let importer = Importer::new(
        Arc::new(readers::passthrough_registry()),
        Arc::clone(&store),
        Arc::new(LoadingTracker::new()),
        config.clone(),
    );

    let sources: Vec<Arc<DataSource>> = files.into_iter().map(DataSource::from_file).collect();
    let results = importer.import_data_sources(sources).await;
    let (succeeded, errored) = partition_results(results);

    if !succeeded.is_empty() {
        println!("Loaded ({} of {} inputs):", succeeded.len(), total);
        for ok in &succeeded {
            print_success(ok, &store);
        }
    }
    if !errored.is_empty() {
        println!("Failed ({} of {} inputs):", errored.len(), total);
        for err in &errored {
            print_failure(err);
        }
    }

    let loadable = loadable_results(&succeeded);
    match find_base_dataset(
        &loadable,
        &store,
        &config.modality_priorities,
        &config.segment_group_extension,
    ) {
        Some(primary) => {
            let name = store
                .name_of(primary.data_id)
                .unwrap_or_else(|| primary.data_source.display_name().to_string());
            println!("Primary dataset: {} [{}]", name, primary.data_type.as_str());
        }
        None => println!("Primary dataset: none"),
    }

    if succeeded.is_empty() && !errored.is_empty() {
        anyhow::bail!("all {total} inputs failed to import");
    }
    Ok(())
}
