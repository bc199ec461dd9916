//! End-to-end load run

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::dataset::Dataset;
use crate::dedup::DedupLog;
use crate::engine::{Executor, RunSummary};
use crate::graph::ReferenceGraph;
use crate::hierarchy::order_by_parent;
use crate::metadata::{enrich, MetadataProvider};
use crate::store::RecordStore;
use dagload_common::{LoadError, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Run context for one load
///
/// Everything that can be wrong with the inputs (unknown models, bad
/// headers, duplicates, cycles) is reported before the first write.
pub struct LoadPipeline<'a> {
    provider: &'a dyn MetadataProvider,
    store: &'a dyn RecordStore,
    batch_size: usize,
    progress: bool,
}

impl<'a> LoadPipeline<'a> {
    pub fn new(provider: &'a dyn MetadataProvider, store: &'a dyn RecordStore) -> Self {
        Self {
            provider,
            store,
            batch_size: DEFAULT_BATCH_SIZE,
            progress: false,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Build the graph for `datasets` without writing anything
    pub async fn plan(&self, datasets: Vec<Dataset>, log: &DedupLog) -> Result<ReferenceGraph> {
        if datasets.is_empty() {
            return Err(LoadError::NoInput);
        }
        if self.batch_size == 0 {
            return Err(LoadError::InvalidBatchSize(self.batch_size));
        }

        log.ensure_writable()?;

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for dataset in &datasets {
            if let Some(first) = seen.insert(dataset.model(), dataset.source()) {
                return Err(LoadError::DuplicateModel {
                    model: dataset.model().to_string(),
                    first: first.to_string(),
                    second: dataset.source().to_string(),
                });
            }
        }

        let mut graph = ReferenceGraph::new();
        for mut dataset in datasets {
            let skipped = dataset.discard_loaded(&log.loaded_identifiers(dataset.model()));
            if skipped > 0 {
                info!(
                    model = dataset.model(),
                    skipped,
                    remaining = dataset.row_count(),
                    "Skipping rows already loaded"
                );
            }
            enrich(&mut dataset, self.provider).await?;
            graph.add_dataset(dataset)?;
        }

        graph.seed_edges();
        graph.execution_order()?;

        for dataset in graph.datasets_mut() {
            order_by_parent(dataset)?;
            let batches = dataset.batch(self.batch_size)?;
            debug!(model = dataset.model(), batches, "Batched dataset");
        }

        Ok(graph)
    }

    /// Write a planned graph, recording every batch outcome in `log`
    pub async fn execute(&self, graph: &mut ReferenceGraph, log: &mut DedupLog) -> Result<RunSummary> {
        Executor::new(self.store)
            .with_progress(self.progress)
            .execute(graph, log)
            .await
    }

    /// Plan and execute
    pub async fn run(&self, datasets: Vec<Dataset>, log: &mut DedupLog) -> Result<RunSummary> {
        let mut graph = self.plan(datasets, log).await?;
        self.execute(&mut graph, log).await
    }
}
