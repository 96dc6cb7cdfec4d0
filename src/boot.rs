//! Runs the mapping over a list of ontology files.
//!
//! Loading errors are fatal and stop the run at the failing file; files
//! mapped before it stay committed. Mapping faults only abort their own file.

use std::path::PathBuf;
#[cfg(feature = "with-db")]
use std::path::Path;

use serde::Serialize;
use tracing::info;

#[cfg(feature = "with-db")]
use crate::graph;
use crate::{
    config::Config,
    graph::domain::GraphStore,
    mapping::{GraphMappingOrchestrator, MappingContext, MappingReport},
    ontology::{loader::OntologyLoader, reasoner},
    Result,
};

/// What a run left in the store.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub reports: Vec<MappingReport>,
    pub nodes: usize,
    pub relationships: usize,
}

/// Maps each file in order into `store`, one transaction per file.
///
/// # Errors
///
/// When a file cannot be loaded. Mapping faults are reported, not returned.
pub async fn map_files<S: GraphStore>(
    store: &S,
    config: &Config,
    paths: &[PathBuf],
) -> Result<Vec<MappingReport>> {
    let classifier = config.classifier();
    let orchestrator = GraphMappingOrchestrator::from_config(store, &config.mapping);

    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let ontology = OntologyLoader::load(path)?;
        let oracle = reasoner::from_config(&config.reasoner, &ontology);
        let context = MappingContext::resolve(
            path.display().to_string(),
            &ontology,
            oracle.as_ref(),
            &classifier,
            &config.annotations,
        );
        reports.push(orchestrator.map_ontology(&context).await);
    }
    Ok(reports)
}

/// Maps `paths` into a store at `db_path` that starts empty.
///
/// # Errors
///
/// When the store cannot be opened or a file cannot be loaded.
#[cfg(feature = "with-db")]
pub async fn run(config: &Config, paths: &[PathBuf], db_path: &Path) -> Result<RunSummary> {
    if let Err(err) = graph::remove_store_directory(db_path) {
        tracing::warn!(
            path = %db_path.display(),
            err.msg = %err,
            "graph_store_directory_not_removed"
        );
    }
    let store = graph::SqliteGraphStore::open(db_path).await?;
    info!(path = %db_path.display(), files = paths.len(), "graph_store_opened");

    let reports = map_files(&store, config, paths).await?;
    summarize(&store, reports).await
}

/// Reads the final node and relationship counts of `store`.
///
/// # Errors
///
/// When the store cannot be read.
pub async fn summarize<S: GraphStore>(store: &S, reports: Vec<MappingReport>) -> Result<RunSummary> {
    let snapshot = store.snapshot().await?;
    let summary = RunSummary {
        reports,
        nodes: snapshot.nodes.len(),
        relationships: snapshot.relationships.len(),
    };
    info!(
        nodes = summary.nodes,
        relationships = summary.relationships,
        committed = summary.reports.iter().filter(|r| r.is_committed()).count(),
        aborted = summary.reports.iter().filter(|r| !r.is_committed()).count(),
        "mapping_run_finished"
    );
    Ok(summary)
}
