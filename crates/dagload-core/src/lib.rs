//! dagload core
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads related tabular datasets into a record store that rejects forward
//! references. Datasets are ordered so referenced models are written first,
//! self-referencing rows are ordered parents first, and every batch outcome
//! is kept in a [`DedupLog`] so that a rerun skips rows already loaded.
//!
//! # Stages
//!
//! - [`metadata::enrich`]: classify columns against a [`MetadataProvider`]
//! - [`ReferenceGraph`]: dataset-level ordering
//! - [`hierarchy::order_by_parent`]: row-level ordering
//! - [`Dataset::batch`]: fixed-size write units
//! - [`Executor`]: sequential writes to a [`RecordStore`]
//!
//! [`LoadPipeline`] runs them in order.
//!
//! # Example
//!
//! ```no_run
//! use dagload_core::{Catalog, Dataset, DedupLog, LoadPipeline, RecordStore, Table, WriteOutcome};
//!
//! struct Discard;
//!
//! #[async_trait::async_trait]
//! impl RecordStore for Discard {
//!     async fn write(
//!         &self,
//!         _model: &str,
//!         _fields: &[String],
//!         rows: &[Vec<String>],
//!     ) -> dagload_common::Result<WriteOutcome> {
//!         Ok(WriteOutcome {
//!             ids: (1..=rows.len() as i64).collect(),
//!             messages: vec![],
//!         })
//!     }
//! }
//!
//! # async fn run() -> dagload_common::Result<()> {
//! let catalog = Catalog::load("catalog.toml")?;
//! let mut table = Table::new(vec!["id".into(), "name".into()]);
//! table.push_row(vec![Some("fr".into()), Some("France".into())]);
//! let countries = Dataset::new("res.country", "res.country.csv", table)?;
//!
//! let mut log = DedupLog::open("log.json")?;
//! let summary = LoadPipeline::new(&catalog, &Discard)
//!     .batch_size(50)
//!     .run(vec![countries], &mut log)
//!     .await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod catalog;
pub mod column;
pub mod dag;
pub mod dataset;
pub mod dedup;
pub mod engine;
pub mod graph;
pub mod hierarchy;
pub mod metadata;
pub mod pipeline;
pub mod store;

pub use batch::{Batch, DEFAULT_BATCH_SIZE};
pub use catalog::Catalog;
pub use column::{Column, Subfield};
pub use dataset::{Cell, Dataset, Row, Table};
pub use dedup::{DedupLog, LogEntry};
pub use engine::{Executor, RunSummary};
pub use graph::{NodeId, ReferenceGraph};
pub use metadata::{MetadataProvider, ModelMeta, RelationalField};
pub use pipeline::LoadPipeline;
pub use store::{LoadResult, LoadState, RecordStore, WriteOutcome};
