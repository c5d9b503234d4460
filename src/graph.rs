//! Weighted directed graph storage.
//!
//! Nodes are dense indices `0..n`; `n` is fixed at construction. Each node owns its
//! outgoing edges in insertion order. Parallel edges are kept as separate entries.

use crate::{Error, Result};

/// A directed edge, owned by its source node's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub target: usize,
    pub weight: f64,
}

/// Read-only adjacency-list view consumed by the solvers.
///
/// Implementors must return edges whose `target < node_count()`, and must return the
/// same slice for the same node for as long as they are borrowed.
pub trait WeightedGraph {
    fn node_count(&self) -> usize;
    fn outgoing_edges(&self, node: usize) -> &[Edge];

    /// Sum of outgoing edge weights of `node`.
    fn out_weight(&self, node: usize) -> f64 {
        self.outgoing_edges(node).iter().map(|e| e.weight).sum()
    }
}

/// Fixed-size graph with per-node adjacency lists.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Graph {
    adj: Vec<Vec<Edge>>,
}

impl Graph {
    /// Graph with `node_count` isolated nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            adj: vec![Vec::new(); node_count],
        }
    }

    /// Builds a graph from `(from, to, weight)` triples, failing on the first bad edge.
    pub fn from_edges<I>(node_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut graph = Self::new(node_count);
        for (from, to, weight) in edges {
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    /// Appends `from -> to` with `weight`.
    ///
    /// Nothing is added when the edge is rejected.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        let n = self.node_count();
        for node in [from, to] {
            if node >= n {
                return Err(Error::OutOfRangeNode {
                    node,
                    node_count: n,
                });
            }
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight { from, to, weight });
        }
        self.adj[from].push(Edge { target: to, weight });
        Ok(())
    }

    /// Outgoing edges of `node`, in insertion order.
    ///
    /// # Panics
    /// If `node >= node_count()`.
    pub fn outgoing_edges(&self, node: usize) -> &[Edge] {
        &self.adj[node]
    }

    pub fn out_weight(&self, node: usize) -> f64 {
        WeightedGraph::out_weight(self, node)
    }
}

impl WeightedGraph for Graph {
    fn node_count(&self) -> usize {
        self.adj.len()
    }

    fn outgoing_edges(&self, node: usize) -> &[Edge] {
        &self.adj[node]
    }
}

/// Rejects adapters that hand out-of-range targets or bad weights to the solver.
pub(crate) fn validate_edges<G>(graph: &G) -> Result<()>
where
    G: WeightedGraph + ?Sized,
{
    let n = graph.node_count();
    for u in 0..n {
        for e in graph.outgoing_edges(u) {
            if e.target >= n {
                return Err(Error::OutOfRangeNode {
                    node: e.target,
                    node_count: n,
                });
            }
            if !e.weight.is_finite() || e.weight < 0.0 {
                return Err(Error::InvalidWeight {
                    from: u,
                    to: e.target,
                    weight: e.weight,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_has_isolated_nodes() {
        let g = Graph::new(4);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 0);
        for u in 0..4 {
            assert!(g.outgoing_edges(u).is_empty());
        }
    }

    #[test]
    fn zero_node_graph() {
        let g = Graph::new(0);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn add_edge_appends_in_order_and_keeps_parallel_edges() {
        let mut g = Graph::new(3);
        g.add_edge(0, 2, 1.5).unwrap();
        g.add_edge(0, 1, 0.5).unwrap();
        g.add_edge(0, 2, 2.0).unwrap();
        assert_eq!(
            g.outgoing_edges(0),
            &[
                Edge { target: 2, weight: 1.5 },
                Edge { target: 1, weight: 0.5 },
                Edge { target: 2, weight: 2.0 },
            ]
        );
        assert!(g.outgoing_edges(1).is_empty());
        assert_eq!(g.out_weight(0), 4.0);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn outgoing_edges_is_restartable() {
        let g = Graph::from_edges(2, [(0, 1, 1.0), (1, 0, 3.0)]).unwrap();
        let a: Vec<_> = g.outgoing_edges(1).to_vec();
        let b: Vec<_> = g.outgoing_edges(1).to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_out_of_range_target() {
        let mut g = Graph::new(3);
        let err = g.add_edge(0, 3, 1.0).unwrap_err();
        assert_eq!(
            err,
            Error::OutOfRangeNode {
                node: 3,
                node_count: 3
            }
        );
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn rejects_out_of_range_source() {
        let mut g = Graph::new(3);
        let err = g.add_edge(usize::MAX, 0, 1.0).unwrap_err();
        assert!(matches!(err, Error::OutOfRangeNode { node: usize::MAX, .. }));
    }

    #[test]
    fn rejects_bad_weights_without_mutation() {
        let mut g = Graph::new(2);
        for w in [-1.0, f64::NAN, f64::INFINITY] {
            let err = g.add_edge(0, 1, w).unwrap_err();
            assert!(matches!(err, Error::InvalidWeight { from: 0, to: 1, .. }), "{err}");
        }
        assert!(g.outgoing_edges(0).is_empty());
        g.add_edge(0, 1, 0.0).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn from_edges_stops_at_first_error() {
        let err = Graph::from_edges(2, [(0, 1, 1.0), (1, 5, 1.0), (1, 0, -2.0)]).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("out of range"), "{msg}");
    }
}
