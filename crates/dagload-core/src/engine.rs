//! Ordered, sequential execution of batched datasets

use crate::dedup::DedupLog;
use crate::graph::ReferenceGraph;
use crate::store::{LoadResult, RecordStore};
use dagload_common::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Totals of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub datasets: usize,
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Records the store reported as written
    pub rows_written: usize,
}

impl RunSummary {
    fn add(&mut self, result: &LoadResult) {
        self.batches += 1;
        if result.is_success() {
            self.succeeded += 1;
            self.rows_written += result.loaded.len();
        } else {
            self.failed += 1;
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} dataset(s), {} batch(es): {} succeeded, {} failed, {} record(s) written",
            self.datasets, self.batches, self.succeeded, self.failed, self.rows_written
        )
    }
}

fn progress_bar(total: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Walks a batched [`ReferenceGraph`] and writes every batch to a store
pub struct Executor<'a> {
    store: &'a dyn RecordStore,
    progress: bool,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store, progress: false }
    }

    /// Draw a terminal progress bar while executing
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Write all batches, referenced datasets first, each dataset's batches
    /// in ascending order
    ///
    /// A reference cycle fails before anything is written. Batches the store
    /// rejects are recorded as failures and the run carries on; only a
    /// failure to persist the log stops it.
    pub async fn execute(&self, graph: &mut ReferenceGraph, log: &mut DedupLog) -> Result<RunSummary> {
        let order = graph.execution_order()?;
        let total: usize = graph.datasets().map(|(_, d)| d.batches().len()).sum();
        let pb = progress_bar(total as u64, self.progress);

        let mut summary = RunSummary {
            datasets: order.len(),
            ..Default::default()
        };

        for id in order {
            let after: Vec<&str> = graph
                .prerequisites(id)
                .into_iter()
                .map(|p| graph.dataset(p).model())
                .collect();
            debug!(
                model = graph.dataset(id).model(),
                source = graph.dataset(id).source(),
                after = ?after,
                "Writing dataset"
            );

            let dataset = graph.dataset_mut(id);
            let model = dataset.model().to_string();
            let label = dataset.label().to_string();
            let fields = dataset.headers().to_vec();
            let batches = dataset.take_batches();
            let count = batches.len();

            pb.set_message(format!("{label} ({model})"));
            for batch in batches {
                info!(
                    model = %model,
                    batch = batch.seq + 1,
                    total = count,
                    "Loading {} ({}), batch {}/{}",
                    label,
                    model,
                    batch.seq + 1,
                    count
                );

                let result = match self.store.write(&model, &fields, &batch.values()).await {
                    Ok(outcome) => LoadResult::from_outcome(&model, &batch, outcome),
                    Err(e) => {
                        warn!(model = %model, batch = batch.seq, error = %e, "Batch write failed");
                        LoadResult::from_error(&model, &batch, e)
                    }
                };
                if !result.is_success() {
                    warn!(
                        model = %model,
                        batch = batch.seq,
                        messages = ?result.messages,
                        "Batch was not loaded"
                    );
                }

                log.record(&result)?;
                summary.add(&result);
                pb.inc(1);
            }
        }

        pb.finish_and_clear();
        info!(%summary, "Run finished");
        Ok(summary)
    }
}
