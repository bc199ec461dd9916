//! Datasets: one input's rows bound to a target model

use crate::batch::Batch;
use crate::column::{index_convention, Column, Subfield};
use dagload_common::{LoadError, Result};
use std::collections::HashSet;

/// A single value; `None` for missing or empty input cells
pub type Cell = Option<String>;

/// One input row, aligned to its table's headers
pub type Row = Vec<Cell>;

/// Raw tabular buffer produced by an input reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows and mapping empty strings to `None`
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.headers.len(), None);
        for cell in row.iter_mut() {
            if cell.as_deref().is_some_and(str::is_empty) {
                *cell = None;
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A dataset node: the rows of one input destined for one model
///
/// The index column is always stored first. Rows live in memory until
/// [`Dataset::batch`] replaces them with a batch sequence.
#[derive(Debug)]
pub struct Dataset {
    model: String,
    source: String,
    label: Option<String>,
    headers: Vec<String>,
    index_convention: Option<Subfield>,
    columns: Vec<Column>,
    parent: Option<String>,
    rows: Option<Vec<Row>>,
    batches: Vec<Batch>,
}

impl Dataset {
    /// Bind a table to a model
    ///
    /// The index column is the one headed `id` or `.id`, falling back to the
    /// first column. Non-empty index values must be unique.
    pub fn new(model: impl Into<String>, source: impl Into<String>, table: Table) -> Result<Self> {
        let model = model.into();
        let Table { mut headers, mut rows } = table;

        if headers.is_empty() {
            return Err(LoadError::MissingIndex(model));
        }

        for row in rows.iter_mut() {
            row.resize(headers.len(), None);
        }

        let index = headers
            .iter()
            .position(|h| index_convention(h).is_some())
            .unwrap_or(0);
        if index != 0 {
            let header = headers.remove(index);
            headers.insert(0, header);
            for row in rows.iter_mut() {
                let cell = row.remove(index);
                row.insert(0, cell);
            }
        }

        let mut seen = HashSet::new();
        for value in rows.iter().filter_map(|row| row[0].as_deref()) {
            if !seen.insert(value) {
                return Err(LoadError::DuplicateIndex {
                    model,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            index_convention: index_convention(&headers[0]),
            model,
            source: source.into(),
            label: None,
            headers,
            columns: Vec::new(),
            parent: None,
            rows: Some(rows),
            batches: Vec::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Where the rows came from (file path, stream, or sheet)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Human-readable name for diagnostics; the model name until enriched
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.model)
    }

    /// Field names as sent to the store, index first
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn index_convention(&self) -> Option<Subfield> {
        self.index_convention
    }

    /// Resolved column descriptors; empty until metadata enrichment
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Name of the self-reference field declared for the model
    pub fn parent_field(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The first column holding the model's self-reference field
    pub fn parent_column(&self) -> Option<(usize, &Column)> {
        let parent = self.parent.as_deref()?;
        self.columns.iter().enumerate().find(|(_, c)| c.name == parent)
    }

    /// Rows still held in memory; `None` once batched
    pub fn rows(&self) -> Option<&[Row]> {
        self.rows.as_deref()
    }

    pub fn row_count(&self) -> usize {
        match self.rows {
            Some(ref rows) => rows.len(),
            None => self.batches.iter().map(Batch::len).sum(),
        }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Drop rows whose index value is in `loaded`, returning how many went
    pub fn discard_loaded(&mut self, loaded: &HashSet<String>) -> usize {
        let Some(rows) = self.rows.as_mut() else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|row| !row[0].as_ref().is_some_and(|id| loaded.contains(id)));
        before - rows.len()
    }

    pub(crate) fn apply_metadata(
        &mut self,
        columns: Vec<Column>,
        parent: Option<String>,
        label: Option<String>,
    ) {
        self.columns = columns;
        self.parent = parent;
        self.label = label;
    }

    pub(crate) fn rows_mut(&mut self) -> Option<&mut Vec<Row>> {
        self.rows.as_mut()
    }

    /// Replace the row buffer with `size`-row batches, releasing the buffer
    pub fn batch(&mut self, size: usize) -> Result<usize> {
        let rows = self.rows.take().unwrap_or_default();
        self.batches = crate::batch::partition(rows, size)?;
        Ok(self.batches.len())
    }

    /// Hand the batches over for execution, leaving none behind
    pub fn take_batches(&mut self) -> Vec<Batch> {
        std::mem::take(&mut self.batches)
    }
}
