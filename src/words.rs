//! Word graphs: text turned into a labelled [`Graph`].
//!
//! Each distinct word is a node, numbered in order of first appearance. Every pair of
//! adjacent words `a b` contributes to a single edge `a -> b` whose weight is the number
//! of times the pair occurs.

use std::collections::HashMap;
use std::fmt::Write as _;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::graph::{Graph, WeightedGraph};
use crate::{Error, Result};

/// Lowercased ASCII-letter runs of `text`; every other character separates words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// A [`Graph`] whose nodes carry unique string labels.
#[derive(Debug, Clone, Default)]
pub struct WordGraph {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    graph: Graph,
}

impl WordGraph {
    pub fn from_text(text: &str) -> Self {
        Self::from_words(tokenize(text))
    }

    /// Builds the graph from an already tokenized word sequence.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels = Vec::new();
        let mut index = HashMap::new();
        // First-seen pair order keeps edge order independent of hashing.
        let mut pairs: Vec<((usize, usize), u64)> = Vec::new();
        let mut pair_slot: HashMap<(usize, usize), usize> = HashMap::new();
        let mut prev: Option<usize> = None;

        for word in words {
            let word = word.into();
            let id = match index.get(&word) {
                Some(&id) => id,
                None => {
                    let id = labels.len();
                    index.insert(word.clone(), id);
                    labels.push(word);
                    id
                }
            };
            if let Some(p) = prev {
                match pair_slot.get(&(p, id)) {
                    Some(&slot) => pairs[slot].1 += 1,
                    None => {
                        pair_slot.insert((p, id), pairs.len());
                        pairs.push(((p, id), 1));
                    }
                }
            }
            prev = Some(id);
        }

        let mut graph = Graph::new(labels.len());
        for ((from, to), count) in pairs {
            // Both ends were interned above and counts are positive.
            let _ = graph.add_edge(from, to, count as f64);
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built word graph"
        );
        Self {
            labels,
            index,
            graph,
        }
    }

    /// Labels an existing graph with its node indices (`"0"`, `"1"`, ...).
    pub fn numbered(graph: Graph) -> Self {
        let labels: Vec<String> = (0..graph.node_count()).map(|i| i.to_string()).collect();
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Self {
            labels,
            index,
            graph,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn node(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// # Panics
    /// If `node >= node_count()`.
    pub fn label(&self, node: usize) -> &str {
        &self.labels[node]
    }

    /// Resolves every word, or reports all of the missing ones at once.
    pub fn lookup(&self, words: &[&str]) -> Result<Vec<usize>> {
        let mut nodes = Vec::with_capacity(words.len());
        let mut missing = Vec::new();
        for &w in words {
            match self.node(w) {
                Some(id) => nodes.push(id),
                None => missing.push(w.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(nodes)
        } else {
            Err(Error::UnknownWords(missing))
        }
    }

    /// Weight of the edge `from -> to`, if any.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        let (a, b) = (self.node(from)?, self.node(to)?);
        self.graph
            .outgoing_edges(a)
            .iter()
            .find(|e| e.target == b)
            .map(|e| e.weight)
    }

    /// Words `b` such that both `from -> b` and `b -> to` exist, in edge order of `from`.
    pub fn bridge_words(&self, from: &str, to: &str) -> Result<Vec<&str>> {
        let ends = self.lookup(&[from, to])?;
        let (a, c) = (ends[0], ends[1]);
        Ok(self
            .graph
            .outgoing_edges(a)
            .iter()
            .filter(|e| self.graph.outgoing_edges(e.target).iter().any(|f| f.target == c))
            .map(|e| self.label(e.target))
            .collect())
    }

    /// Re-tokenizes `text` and inserts one bridge word, picked with a seeded RNG, between
    /// each adjacent pair that has any. Unknown words pass through unchanged.
    pub fn bridge_text(&self, text: &str, seed: u64) -> String {
        let words = tokenize(text);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out: Vec<&str> = Vec::with_capacity(words.len() * 2);
        for (i, w) in words.iter().enumerate() {
            out.push(w);
            if let Some(next) = words.get(i + 1) {
                if let Ok(bridges) = self.bridge_words(w, next) {
                    if let Some(b) = bridges.choose(&mut rng) {
                        out.push(*b);
                    }
                }
            }
        }
        out.join(" ")
    }

    /// Score of `word` in a solver output indexed like this graph.
    pub fn rank_of(&self, scores: &[f64], word: &str) -> Result<f64> {
        let id = self.lookup(&[word])?[0];
        Ok(scores.get(id).copied().unwrap_or(0.0))
    }

    /// One line per node: `word -> next(count), other(count)`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (u, label) in self.labels.iter().enumerate() {
            let edges: Vec<String> = self
                .graph
                .outgoing_edges(u)
                .iter()
                .map(|e| format!("{}({})", self.label(e.target), e.weight))
                .collect();
            let rhs = if edges.is_empty() {
                "no outgoing edges".to_string()
            } else {
                edges.join(", ")
            };
            let _ = writeln!(out, "{label} -> {rhs}");
        }
        out
    }
}

impl WeightedGraph for WordGraph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn outgoing_edges(&self, node: usize) -> &[crate::graph::Edge] {
        self.graph.outgoing_edges(node)
    }
}
