//! `graphrank`: weighted PageRank over in-memory directed adjacency lists.
//!
//! Build a [`Graph`], hand it to [`pagerank_checked_run`], read the scores off the
//! returned [`PageRankRun`]. [`WordGraph`] turns text into a labelled graph of adjacent
//! word pairs; [`shortest_path`] and [`random_walk`] work on any [`WeightedGraph`].
//!
//! Public invariants (must not drift):
//! - **Node order**: outputs are indexed by node id \(0..n-1\).
//! - **Determinism**: identical graph + config produce bit-identical scores. The
//!   `parallel` solver is deterministic for a fixed partition count.
//! - **No silent normalization**: dangling-node handling is explicit in
//!   [`DanglingPolicy`]; the default drops dangling mass, so scores may sum to less
//!   than 1. Use [`normalize`] or [`DanglingPolicy::Uniform`] when a distribution is
//!   required.
//!
//! Swappable (allowed to change without breaking the contract):
//! - iteration strategy (serial vs parallel)
//! - internal buffers (so long as invariants hold)

pub mod graph;
pub mod pagerank;
pub mod paths;
pub mod topk;
pub mod words;

pub use graph::{Edge, Graph, WeightedGraph};
pub use pagerank::{pagerank, pagerank_checked, pagerank_checked_run, pagerank_run};
pub use pagerank::{pagerank_observed, DanglingPolicy, Iterate, PageRankConfig, PageRankRun};
pub use paths::{random_walk, shortest_path, ShortestPath};
pub use topk::{normalize, top_k};
pub use words::{tokenize, WordGraph};

#[cfg(feature = "parallel")]
pub use pagerank::pagerank_parallel_checked_run;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("node index out of range: {node} (node_count={node_count})")]
    OutOfRangeNode { node: usize, node_count: usize },
    #[error("invalid weight on edge {from} -> {to}: {weight} (must be finite and non-negative)")]
    InvalidWeight { from: usize, to: usize, weight: f64 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("no {} in the graph", quote_all(.0))]
    UnknownWords(Vec<String>),
}

fn quote_all(words: &[String]) -> String {
    words
        .iter()
        .map(|w| format!("\"{w}\""))
        .collect::<Vec<_>>()
        .join(" and ")
}

pub type Result<T> = std::result::Result<T, Error>;
