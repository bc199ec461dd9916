//! Row ordering for self-referencing datasets
//!
//! A category tree loaded in one file must be written parents first. Rows are
//! re-sequenced so that each row follows the row its parent cell points at.

use crate::dag::Dag;
use crate::dataset::Dataset;
use dagload_common::{LoadError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Reorder a dataset's rows along its parent column
///
/// Returns `false` when the dataset has no usable parent column: none
/// declared, none present, or a parent column whose identifier convention
/// differs from the index column's. Parents that are null or absent from the
/// dataset impose no constraint.
pub fn order_by_parent(dataset: &mut Dataset) -> Result<bool> {
    let Some((parent_idx, column)) = dataset.parent_column() else {
        return Ok(false);
    };

    let convention = dataset.index_convention();
    if convention.is_none() || column.subfield != convention {
        debug!(
            model = dataset.model(),
            column = %column.header,
            index = dataset.headers()[0].as_str(),
            "Parent column does not match the index convention, skipping hierarchy ordering"
        );
        return Ok(false);
    }

    let model = dataset.model().to_string();
    let Some(rows) = dataset.rows_mut() else {
        return Ok(false);
    };

    let positions: HashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row[0].as_deref().map(|id| (id, i)))
        .collect();

    let mut dag = Dag::new(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if let Some(&parent) = row[parent_idx].as_deref().and_then(|p| positions.get(p)) {
            dag.add_dependency(i, parent);
        }
    }

    let order = dag.topological_order().map_err(|cycle| LoadError::HierarchyCycle {
        model: model.clone(),
        rows: cycle
            .nodes
            .iter()
            .map(|&n| rows[n][0].clone().unwrap_or_default())
            .collect(),
    })?;

    let edges = dag.edge_count();
    let mut slots: Vec<_> = std::mem::take(rows).into_iter().map(Some).collect();
    *rows = order.into_iter().filter_map(|i| slots[i].take()).collect();

    debug!(model = %model, rows = rows.len(), edges, "Ordered rows by parent");
    Ok(true)
}
