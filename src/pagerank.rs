//! Weighted PageRank centrality.
//!
//! A node's rank is split across its outgoing edges in proportion to edge weight:
//! \[
//!   P(u \to v) = \frac{w(u,v)}{\sum_x w(u,x)}
//! \]
//! then damped toward the uniform distribution:
//! \[
//!   r'_i = \frac{1 - d}{n} + d \sum_{u \to i} r_u P(u \to i)
//! \]
//!
//! Nodes whose outgoing weights sum to zero are dangling; what happens to their rank
//! is controlled by [`DanglingPolicy`].

use std::ops::Range;

use tracing::{debug, trace};

use crate::graph::{validate_edges, WeightedGraph};
use crate::{Error, Result};

/// What to do with the rank held by nodes that have zero total outgoing weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DanglingPolicy {
    /// Dangling rank is not redistributed; total rank can fall below 1.
    #[default]
    Drop,
    /// Dangling rank is spread evenly over all nodes before damping; total rank stays 1.
    Uniform,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRankRun {
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub diff_l1: f64,
    pub converged: bool,
}

impl PageRankRun {
    fn empty() -> Self {
        Self {
            scores: Vec::new(),
            iterations: 0,
            diff_l1: 0.0,
            converged: true,
        }
    }
}

/// Snapshot handed to the observer of [`pagerank_observed`].
#[derive(Debug, Clone, Copy)]
pub struct Iterate<'a> {
    /// 0 for the initial vector, `k` after the k-th update.
    pub iteration: usize,
    pub scores: &'a [f64],
    /// L1 change from the previous vector; `None` for the initial vector.
    pub diff_l1: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    /// Stop once the L1 change between consecutive vectors drops below this.
    pub tolerance: f64,
    pub dangling: DanglingPolicy,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            dangling: DanglingPolicy::Drop,
        }
    }
}

impl PageRankConfig {
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::InvalidConfig(format!(
                "damping must be in [0,1] (got {})",
                self.damping
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be >= 0 (got {})",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Checked PageRank centrality.
///
/// Validates `config` and the adapter's edges, then runs [`pagerank_run`].
pub fn pagerank_checked_run<G>(graph: &G, config: PageRankConfig) -> Result<PageRankRun>
where
    G: WeightedGraph + ?Sized,
{
    config.validate()?;
    validate_edges(graph)?;
    Ok(pagerank_run(graph, config))
}

pub fn pagerank_checked<G>(graph: &G, config: PageRankConfig) -> Result<Vec<f64>>
where
    G: WeightedGraph + ?Sized,
{
    pagerank_checked_run(graph, config).map(|run| run.scores)
}

pub fn pagerank<G>(graph: &G, config: PageRankConfig) -> Vec<f64>
where
    G: WeightedGraph + ?Sized,
{
    pagerank_run(graph, config).scores
}

/// PageRank with convergence reporting.
///
/// `iterations` is the number of update steps performed.
/// `diff_l1` is the final \(L_1\) residual (sum of absolute deltas).
///
/// No validation: out-of-domain settings produce meaningless (but finite-time) output.
///
/// # Panics
/// If a `WeightedGraph` adapter hands out an edge with `target >= node_count()`.
/// [`Graph`](crate::Graph) never does; use [`pagerank_checked_run`] for other adapters.
pub fn pagerank_run<G>(graph: &G, config: PageRankConfig) -> PageRankRun
where
    G: WeightedGraph + ?Sized,
{
    let n = graph.node_count();
    iterate(graph, &config, |op, scores, next| op.spread(scores, 0..n, next), |_| {})
}

/// Checked PageRank that reports every intermediate vector to `observer`.
///
/// The observer sees the uniform start first, then the vector after each update.
pub fn pagerank_observed<G, O>(graph: &G, config: PageRankConfig, observer: O) -> Result<PageRankRun>
where
    G: WeightedGraph + ?Sized,
    O: FnMut(&Iterate<'_>),
{
    config.validate()?;
    validate_edges(graph)?;
    let n = graph.node_count();
    Ok(iterate(
        graph,
        &config,
        |op, scores, next| op.spread(scores, 0..n, next),
        observer,
    ))
}

/// Checked PageRank with the edge pass split across `partitions` rayon tasks.
///
/// Source nodes are cut into `partitions` contiguous ranges; each range accumulates
/// into its own buffer and the buffers are summed in range order. Output is
/// reproducible for a fixed `partitions`, and bit-identical to [`pagerank_run`] when
/// `partitions == 1`.
#[cfg(feature = "parallel")]
pub fn pagerank_parallel_checked_run<G>(
    graph: &G,
    config: PageRankConfig,
    partitions: usize,
) -> Result<PageRankRun>
where
    G: WeightedGraph + Sync + ?Sized,
{
    use rayon::prelude::*;

    config.validate()?;
    if partitions == 0 {
        return Err(Error::InvalidConfig(
            "partitions must be >= 1 (got 0)".to_string(),
        ));
    }
    validate_edges(graph)?;

    let n = graph.node_count();
    let ranges = partition_ranges(n, partitions);
    Ok(iterate(
        graph,
        &config,
        |op, scores, next| {
            let partials: Vec<Vec<f64>> = ranges
                .par_iter()
                .map(|range| {
                    let mut acc = vec![0.0; n];
                    op.spread(scores, range.clone(), &mut acc);
                    acc
                })
                .collect();
            for partial in &partials {
                for (x, p) in next.iter_mut().zip(partial) {
                    *x += p;
                }
            }
        },
        |_| {},
    ))
}

#[cfg(feature = "parallel")]
fn partition_ranges(n: usize, partitions: usize) -> Vec<Range<usize>> {
    let chunk = n.div_ceil(partitions).max(1);
    (0..n)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(n))
        .collect()
}

/// Edge-pass state shared by every iteration: the graph plus its outgoing weight sums.
struct Operator<'g, G: ?Sized> {
    graph: &'g G,
    out_wsum: Vec<f64>,
}

impl<'g, G> Operator<'g, G>
where
    G: WeightedGraph + ?Sized,
{
    fn new(graph: &'g G) -> Self {
        let out_wsum = (0..graph.node_count())
            .map(|u| graph.out_weight(u))
            .collect();
        Self { graph, out_wsum }
    }

    /// Adds the undamped contributions of source nodes in `sources` into `acc`.
    fn spread(&self, scores: &[f64], sources: Range<usize>, acc: &mut [f64]) {
        for u in sources {
            let ws = self.out_wsum[u];
            if ws == 0.0 {
                continue;
            }
            let mass = scores[u];
            for e in self.graph.outgoing_edges(u) {
                acc[e.target] += mass * (e.weight / ws);
            }
        }
    }

    fn dangling_mass(&self, scores: &[f64]) -> f64 {
        self.out_wsum
            .iter()
            .zip(scores)
            .filter(|(&ws, _)| ws == 0.0)
            .map(|(_, &s)| s)
            .sum()
    }
}

fn iterate<G, A, O>(graph: &G, config: &PageRankConfig, mut accumulate: A, mut observe: O) -> PageRankRun
where
    G: WeightedGraph + ?Sized,
    A: FnMut(&Operator<'_, G>, &[f64], &mut [f64]),
    O: FnMut(&Iterate<'_>),
{
    let n = graph.node_count();
    if n == 0 {
        return PageRankRun::empty();
    }

    debug!(
        nodes = n,
        damping = config.damping,
        max_iterations = config.max_iterations,
        tolerance = config.tolerance,
        dangling = ?config.dangling,
        "pagerank start"
    );

    let n_f64 = n as f64;
    let op = Operator::new(graph);
    let mut scores = vec![1.0 / n_f64; n];
    let mut new_scores = vec![0.0; n];
    let teleport = (1.0 - config.damping) / n_f64;

    observe(&Iterate {
        iteration: 0,
        scores: &scores,
        diff_l1: None,
    });

    let mut iters = 0usize;
    let mut last_diff = f64::INFINITY;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        iters += 1;
        new_scores.fill(0.0);
        accumulate(&op, &scores[..], &mut new_scores[..]);

        match config.dangling {
            DanglingPolicy::Drop => {
                for x in new_scores.iter_mut() {
                    *x = teleport + config.damping * *x;
                }
            }
            DanglingPolicy::Uniform => {
                let share = op.dangling_mass(&scores) / n_f64;
                for x in new_scores.iter_mut() {
                    *x = teleport + config.damping * (*x + share);
                }
            }
        }

        let diff: f64 = scores
            .iter()
            .zip(new_scores.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();
        last_diff = diff;
        std::mem::swap(&mut scores, &mut new_scores);

        trace!(iteration = iters, diff_l1 = diff, "pagerank step");
        observe(&Iterate {
            iteration: iters,
            scores: &scores,
            diff_l1: Some(diff),
        });

        if diff < config.tolerance {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(iterations = iters, diff_l1 = last_diff, "pagerank converged");
    } else {
        debug!(
            iterations = iters,
            diff_l1 = last_diff,
            "pagerank hit iteration cap before converging"
        );
    }

    PageRankRun {
        scores,
        iterations: iters,
        diff_l1: last_diff,
        converged,
    }
}
