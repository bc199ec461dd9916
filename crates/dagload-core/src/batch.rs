//! Fixed-size batching of row-ordered datasets

use crate::dataset::Row;
use dagload_common::{LoadError, Result};

/// Default number of rows per write
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// One write unit: a contiguous slice of a dataset's ordered rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 0-based position within the dataset
    pub seq: usize,
    /// Rows with the index value first
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index values of the rows in this batch
    pub fn candidates(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.first().cloned().flatten().unwrap_or_default())
            .collect()
    }

    /// Rows as strings, nulls written as empty values
    pub fn values(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.clone().unwrap_or_default()).collect())
            .collect()
    }
}

/// Cut `rows` into consecutive groups of `size`, the last possibly shorter
pub fn partition(rows: Vec<Row>, size: usize) -> Result<Vec<Batch>> {
    if size == 0 {
        return Err(LoadError::InvalidBatchSize(size));
    }

    let mut batches = Vec::with_capacity(rows.len().div_ceil(size));
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        batches.push(Batch {
            seq: batches.len(),
            rows: rows.by_ref().take(size).collect(),
        });
    }
    Ok(batches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| vec![Some(format!("r{i}")), None]).collect()
    }

    #[test]
    fn test_partition_sizes() {
        for (total, size) in [(0, 3), (1, 3), (3, 3), (7, 3), (10, 1), (5, 50)] {
            let batches = partition(rows(total), size).unwrap();
            assert_eq!(batches.len(), total.div_ceil(size), "{total} rows by {size}");
            for (i, batch) in batches.iter().enumerate() {
                assert_eq!(batch.seq, i);
                if i + 1 < batches.len() {
                    assert_eq!(batch.len(), size);
                }
            }
        }
    }

    #[test]
    fn test_partition_preserves_order() {
        let input = rows(8);
        let batches = partition(input.clone(), 3).unwrap();
        let flattened: Vec<Row> = batches.into_iter().flat_map(|b| b.rows).collect();
        assert_eq!(flattened, input);
    }

    #[test]
    fn test_zero_batch_size() {
        assert!(matches!(partition(rows(2), 0), Err(LoadError::InvalidBatchSize(0))));
    }

    #[test]
    fn test_candidates_and_values() {
        let batch = Batch {
            seq: 0,
            rows: vec![vec![Some("a".into()), None], vec![None, Some("x".into())]],
        };
        assert_eq!(batch.candidates(), vec!["a".to_string(), String::new()]);
        assert_eq!(
            batch.values(),
            vec![vec!["a".to_string(), String::new()], vec![String::new(), "x".to_string()]]
        );
    }
}
