//! Dataset-level reference graph
//!
//! Nodes are the datasets of one run, addressed by [`NodeId`]. An edge
//! A -> B says A holds a column referencing B's model, so every batch of B
//! must be written before any batch of A.

use crate::dag::Dag;
use crate::dataset::Dataset;
use dagload_common::{LoadError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Handle of a dataset node within one [`ReferenceGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A reference from one dataset's column to another dataset's model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Referencing column of `from`
    pub column: String,
}

#[derive(Debug, Default)]
pub struct ReferenceGraph {
    nodes: Vec<Dataset>,
    edges: Vec<Edge>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset node; each model may appear once per run
    pub fn add_dataset(&mut self, dataset: Dataset) -> Result<NodeId> {
        if let Some(existing) = self.nodes.iter().find(|n| n.model() == dataset.model()) {
            return Err(LoadError::DuplicateModel {
                model: dataset.model().to_string(),
                first: existing.source().to_string(),
                second: dataset.source().to_string(),
            });
        }
        self.nodes.push(dataset);
        Ok(NodeId(self.nodes.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dataset(&self, id: NodeId) -> &Dataset {
        &self.nodes[id.0]
    }

    pub fn dataset_mut(&mut self, id: NodeId) -> &mut Dataset {
        &mut self.nodes[id.0]
    }

    pub fn datasets(&self) -> impl Iterator<Item = (NodeId, &Dataset)> {
        self.nodes.iter().enumerate().map(|(i, d)| (NodeId(i), d))
    }

    pub fn datasets_mut(&mut self) -> impl Iterator<Item = &mut Dataset> {
        self.nodes.iter_mut()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Derive edges from the enriched columns of every node
    ///
    /// Parent columns are skipped: a dataset's references to itself are
    /// ordered row by row instead.
    pub fn seed_edges(&mut self) {
        let by_model: HashMap<&str, NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, d)| (d.model(), NodeId(i)))
            .collect();

        let mut edges = Vec::new();
        for (i, dataset) in self.nodes.iter().enumerate() {
            let parent = dataset.parent_field();
            for column in dataset.columns() {
                if parent == Some(column.name.as_str()) {
                    continue;
                }
                let Some(target) = column.references.as_deref().and_then(|m| by_model.get(m)) else {
                    continue;
                };
                if target.0 == i {
                    continue;
                }
                debug!(
                    from = dataset.model(),
                    to = self.nodes[target.0].model(),
                    column = %column.header,
                    "Reference edge"
                );
                edges.push(Edge {
                    from: NodeId(i),
                    to: *target,
                    column: column.name.clone(),
                });
            }
        }
        self.edges = edges;
    }

    fn dag(&self) -> Dag {
        let mut dag = Dag::new(self.nodes.len());
        for edge in &self.edges {
            dag.add_dependency(edge.from.0, edge.to.0);
        }
        dag
    }

    /// Order in which datasets may be written
    ///
    /// Unrelated datasets keep their input order.
    pub fn execution_order(&self) -> Result<Vec<NodeId>> {
        self.dag()
            .topological_order()
            .map(|order| order.into_iter().map(NodeId).collect())
            .map_err(|cycle| LoadError::ReferenceCycle {
                models: cycle
                    .nodes
                    .iter()
                    .map(|&n| self.nodes[n].model().to_string())
                    .collect(),
            })
    }

    /// Datasets that must be written before `id`
    pub fn prerequisites(&self, id: NodeId) -> Vec<NodeId> {
        self.dag().prerequisites(id.0).map(NodeId).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::dataset::Table;
    use crate::metadata::enrich;

    fn catalog() -> Catalog {
        Catalog::from_toml_str(
            r#"
            [models."res.country"]
            [models."res.country.state"]
            relations = { country_id = "res.country" }
            [models."res.partner"]
            parent = "parent_id"
            relations = { country_id = "res.country", state_id = "res.country.state", parent_id = "res.partner", company_id = "res.company" }
            [models."a"]
            relations = { b_id = "b" }
            [models."b"]
            relations = { a_id = "a" }
            "#,
        )
        .unwrap()
    }

    async fn graph(inputs: &[(&str, &[&str])]) -> ReferenceGraph {
        let catalog = catalog();
        let mut graph = ReferenceGraph::new();
        for (model, headers) in inputs {
            let mut ds = Dataset::new(
                *model,
                "test",
                Table::new(headers.iter().map(|h| h.to_string()).collect()),
            )
            .unwrap();
            enrich(&mut ds, &catalog).await.unwrap();
            graph.add_dataset(ds).unwrap();
        }
        graph.seed_edges();
        graph
    }

    fn models(graph: &ReferenceGraph, order: &[NodeId]) -> Vec<String> {
        order.iter().map(|&id| graph.dataset(id).model().to_string()).collect()
    }

    #[tokio::test]
    async fn test_referenced_dataset_goes_first() {
        let graph = graph(&[
            ("res.partner", &["id", "name", "country_id/id"]),
            ("res.country", &["id", "name"]),
        ])
        .await;

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].column, "country_id");
        let order = graph.execution_order().unwrap();
        assert_eq!(models(&graph, &order), ["res.country", "res.partner"]);
    }

    #[tokio::test]
    async fn test_parent_and_absent_models_add_no_edges() {
        let graph = graph(&[("res.partner", &["id", "parent_id/id", "company_id/id"])]).await;
        assert!(graph.edges().is_empty());
        assert_eq!(graph.execution_order().unwrap(), vec![NodeId(0)]);
    }

    #[tokio::test]
    async fn test_multiple_columns_one_constraint() {
        let graph = graph(&[
            ("res.partner", &["id", "country_id/id", "country_id/.id", "state_id/id"]),
            ("res.country.state", &["id", "country_id/id"]),
            ("res.country", &["id"]),
        ])
        .await;

        assert_eq!(graph.edges().len(), 4);
        assert_eq!(graph.dag().edge_count(), 3);
        let order = graph.execution_order().unwrap();
        assert_eq!(models(&graph, &order), ["res.country", "res.country.state", "res.partner"]);
        assert_eq!(graph.prerequisites(NodeId(0)), vec![NodeId(1), NodeId(2)]);
    }

    #[tokio::test]
    async fn test_reference_cycle_is_fatal() {
        let graph = graph(&[("a", &["id", "b_id/id"]), ("b", &["id", "a_id/id"])]).await;
        let err = graph.execution_order().unwrap_err();
        assert!(matches!(err, LoadError::ReferenceCycle { ref models } if models == &["a", "b"]));
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let mut graph = ReferenceGraph::new();
        let ds = || Dataset::new("res.country", "x", Table::new(vec!["id".into()])).unwrap();
        graph.add_dataset(ds()).unwrap();
        assert!(matches!(graph.add_dataset(ds()), Err(LoadError::DuplicateModel { .. })));
    }
}
