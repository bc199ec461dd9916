//! Dependency graph over opaque node handles
//!
//! Shared by the dataset-level reference graph and the row-level hierarchy
//! graph. Nodes are dense indices `0..len`; an edge records that a node may
//! only be processed after one of its prerequisites.

use std::collections::BTreeSet;
use thiserror::Error;

/// Nodes that can never become ready
///
/// Holds the nodes lying on a cycle (or between two cycles); nodes that are
/// merely downstream of a cycle are left out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle through {} node(s)", .nodes.len())]
pub struct Cycle {
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Dag {
    prerequisites: Vec<BTreeSet<usize>>,
    dependents: Vec<BTreeSet<usize>>,
}

impl Dag {
    pub fn new(len: usize) -> Self {
        Self {
            prerequisites: vec![BTreeSet::new(); len],
            dependents: vec![BTreeSet::new(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.prerequisites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prerequisites.is_empty()
    }

    /// Record that `node` must come after `prerequisite`
    ///
    /// Returns `false` when the constraint already existed.
    pub fn add_dependency(&mut self, node: usize, prerequisite: usize) -> bool {
        self.dependents[prerequisite].insert(node);
        self.prerequisites[node].insert(prerequisite)
    }

    pub fn prerequisites(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.prerequisites[node].iter().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.prerequisites.iter().map(BTreeSet::len).sum()
    }

    /// Order every node after all of its prerequisites
    ///
    /// Among nodes that are ready at the same time the lowest index goes
    /// first, so unconstrained nodes keep their original relative order.
    pub fn topological_order(&self) -> Result<Vec<usize>, Cycle> {
        let mut pending: Vec<usize> = self.prerequisites.iter().map(BTreeSet::len).collect();
        let mut ready: BTreeSet<usize> = (0..self.len()).filter(|&n| pending[n] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            for &dependent in &self.dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() == self.len() {
            return Ok(order);
        }

        Err(Cycle {
            nodes: self.cycle_members(&pending),
        })
    }

    /// Strip nodes that only hang off a cycle from the unresolved set
    fn cycle_members(&self, pending: &[usize]) -> Vec<usize> {
        let mut remaining: BTreeSet<usize> = (0..self.len()).filter(|&n| pending[n] > 0).collect();
        loop {
            let leaves: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&n| !self.dependents[n].iter().any(|d| remaining.contains(d)))
                .collect();
            if leaves.is_empty() {
                return remaining.into_iter().collect();
            }
            for leaf in leaves {
                remaining.remove(&leaf);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_prerequisites_come_first() {
        let mut dag = Dag::new(4);
        dag.add_dependency(0, 3);
        dag.add_dependency(3, 2);
        dag.add_dependency(1, 0);

        assert_eq!(dag.topological_order().unwrap(), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_unconstrained_nodes_keep_input_order() {
        let dag = Dag::new(5);
        assert_eq!(dag.topological_order().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut dag = Dag::new(2);
        assert!(dag.add_dependency(1, 0));
        assert!(!dag.add_dependency(1, 0));
        assert_eq!(dag.edge_count(), 1);
        assert_eq!(dag.topological_order().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_cycle_reports_members_only() {
        // 0 <-> 1, and 2 depends on the cycle
        let mut dag = Dag::new(3);
        dag.add_dependency(0, 1);
        dag.add_dependency(1, 0);
        dag.add_dependency(2, 1);

        let cycle = dag.topological_order().unwrap_err();
        assert_eq!(cycle.nodes, vec![0, 1]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut dag = Dag::new(2);
        dag.add_dependency(1, 1);

        assert_eq!(dag.topological_order().unwrap_err().nodes, vec![1]);
    }

    #[test]
    fn test_empty() {
        assert!(Dag::new(0).topological_order().unwrap().is_empty());
    }
}
