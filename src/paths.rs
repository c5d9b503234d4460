//! Walks and shortest paths over [`WeightedGraph`] adapters.
//!
//! Edge weights are read as lengths here, not as transition shares.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::graph::{validate_edges, WeightedGraph};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShortestPath {
    /// `source` first, `target` last.
    pub nodes: Vec<usize>,
    /// Sum of the edge weights along `nodes`.
    pub length: f64,
}

/// Heap entry; ordering is reversed so `BinaryHeap` pops the smallest distance first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn check_node(node: usize, node_count: usize) -> Result<()> {
    if node >= node_count {
        return Err(Error::OutOfRangeNode { node, node_count });
    }
    Ok(())
}

/// Dijkstra from `source` to `target`.
///
/// Returns `Ok(None)` when `target` is unreachable. Among equal-length paths the one
/// discovered first wins, so results are deterministic for a fixed edge order.
pub fn shortest_path<G>(graph: &G, source: usize, target: usize) -> Result<Option<ShortestPath>>
where
    G: WeightedGraph + ?Sized,
{
    let n = graph.node_count();
    check_node(source, n)?;
    check_node(target, n)?;
    validate_edges(graph)?;

    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    dist[source] = 0.0;
    heap.push(Frontier {
        dist: 0.0,
        node: source,
    });

    while let Some(Frontier { dist: d, node: u }) = heap.pop() {
        if d > dist[u] {
            continue;
        }
        if u == target {
            break;
        }
        for e in graph.outgoing_edges(u) {
            let candidate = d + e.weight;
            if candidate < dist[e.target] {
                dist[e.target] = candidate;
                prev[e.target] = Some(u);
                heap.push(Frontier {
                    dist: candidate,
                    node: e.target,
                });
            }
        }
    }

    if dist[target].is_infinite() {
        return Ok(None);
    }
    let mut nodes = vec![target];
    let mut cur = target;
    while let Some(p) = prev[cur] {
        nodes.push(p);
        cur = p;
    }
    nodes.reverse();
    Ok(Some(ShortestPath {
        nodes,
        length: dist[target],
    }))
}

/// Uniform random walk that stops at a node without outgoing edges, or just before
/// it would traverse an edge `(u, v)` for the second time.
///
/// `start = None` picks the start node with the same seeded RNG. Every outgoing edge
/// is equally likely regardless of weight. An empty graph yields an empty walk.
pub fn random_walk<G>(graph: &G, start: Option<usize>, seed: u64) -> Result<Vec<usize>>
where
    G: WeightedGraph + ?Sized,
{
    let n = graph.node_count();
    if let Some(s) = start {
        check_node(s, n)?;
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    validate_edges(graph)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut current = match start {
        Some(s) => s,
        None => rng.gen_range(0..n),
    };
    let mut walk = vec![current];
    let mut traversed: HashSet<(usize, usize)> = HashSet::new();

    while let Some(edge) = graph.outgoing_edges(current).choose(&mut rng) {
        if !traversed.insert((current, edge.target)) {
            break;
        }
        walk.push(edge.target);
        current = edge.target;
    }
    Ok(walk)
}
