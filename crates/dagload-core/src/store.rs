//! Record store interface and per-batch results

use crate::batch::Batch;
use async_trait::async_trait;
use dagload_common::Result;
use serde::{Deserialize, Serialize};

/// What the store reports for one write call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Identifiers assigned to written records; empty when nothing was written
    pub ids: Vec<i64>,
    pub messages: Vec<String>,
}

/// A store that enforces referential integrity on write
///
/// Implementations either write all rows of a call or report why not; an
/// `Err` is reserved for transport or server faults.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write `rows` (values aligned to `fields`) into `model`
    async fn write(&self, model: &str, fields: &[String], rows: &[Vec<String>]) -> Result<WriteOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Success,
    Failure,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Success => f.write_str("success"),
            LoadState::Failure => f.write_str("failure"),
        }
    }
}

/// Outcome of one batch write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub model: String,
    pub batch: usize,
    pub state: LoadState,
    pub loaded: Vec<i64>,
    /// Index values of the rows that were submitted
    pub candidates: Vec<String>,
    pub messages: Vec<String>,
}

impl LoadResult {
    pub fn from_outcome(model: &str, batch: &Batch, outcome: WriteOutcome) -> Self {
        let state = if outcome.ids.is_empty() {
            LoadState::Failure
        } else {
            LoadState::Success
        };
        Self {
            model: model.to_string(),
            batch: batch.seq,
            state,
            loaded: outcome.ids,
            candidates: batch.candidates(),
            messages: outcome.messages,
        }
    }

    /// A batch the store could not process at all
    pub fn from_error(model: &str, batch: &Batch, error: impl ToString) -> Self {
        Self {
            model: model.to_string(),
            batch: batch.seq,
            state: LoadState::Failure,
            loaded: Vec::new(),
            candidates: batch.candidates(),
            messages: vec![error.to_string()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == LoadState::Success
    }
}
