// src/bin/graphrank.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use graphrank::{
    normalize, pagerank_checked_run, random_walk, shortest_path, top_k, DanglingPolicy, Graph,
    PageRankConfig, WordGraph,
};

const SAMPLE_NODES: usize = 10;
/// Edges of the built-in demo graph, all weight 1.0.
const SAMPLE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 2),
    (1, 3),
    (2, 4),
    (3, 5),
    (4, 5),
    (5, 6),
    (5, 7),
    (5, 8),
    (6, 9),
    (9, 5),
    (8, 0),
];

#[derive(Parser, Debug)]
#[command(name = "graphrank", version, about = "Weighted PageRank over a directed graph")]
struct Cli {
    /// Build a word graph from this text file (replaces the built-in demo graph)
    #[arg(long, value_name = "FILE", conflicts_with = "nodes")]
    text: Option<PathBuf>,

    /// Node count of a custom graph (replaces the built-in demo graph)
    #[arg(long)]
    nodes: Option<usize>,

    /// Directed edge of the custom graph; repeatable
    #[arg(
        long = "edge",
        value_name = "FROM:TO:WEIGHT",
        value_parser = parse_edge,
        allow_hyphen_values = true,
        requires = "nodes"
    )]
    edges: Vec<(usize, usize, f64)>,

    #[arg(long, default_value_t = PageRankConfig::default().damping)]
    damping: f64,

    #[arg(long, default_value_t = PageRankConfig::default().max_iterations)]
    max_iterations: usize,

    /// L1 change below which iteration stops
    #[arg(long, default_value_t = PageRankConfig::default().tolerance)]
    tolerance: f64,

    /// Treatment of nodes with no outgoing weight
    #[arg(long, value_enum, default_value_t = Dangling::Drop)]
    dangling: Dangling,

    /// Decimal digits printed per rank
    #[arg(long, default_value_t = 6)]
    precision: usize,

    /// Only print the K highest-ranked nodes
    #[arg(long, value_name = "K")]
    top: Option<usize>,

    /// Only print the rank of this node label or word; repeatable
    #[arg(long = "word", value_name = "WORD", conflicts_with = "top")]
    words: Vec<String>,

    /// Rescale ranks to sum to 1 before printing
    #[arg(long)]
    normalize: bool,

    /// Print the run as JSON
    #[arg(long)]
    json: bool,

    /// Log solver progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Ranks the graph when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every node with its outgoing edges and weights
    Show,
    /// List the words B with edges FROM -> B -> TO
    Bridge { from: String, to: String },
    /// Insert bridge words between adjacent words of TEXT
    Generate {
        text: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Shortest weighted path between two nodes
    Path { from: String, to: String },
    /// Random walk until a dead end or a repeated edge
    Walk {
        /// Start node label; random when omitted
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Also write the walk to this file
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Dangling {
    Drop,
    Uniform,
}

impl From<Dangling> for DanglingPolicy {
    fn from(d: Dangling) -> Self {
        match d {
            Dangling::Drop => DanglingPolicy::Drop,
            Dangling::Uniform => DanglingPolicy::Uniform,
        }
    }
}

#[derive(Serialize)]
struct Report {
    iterations: usize,
    converged: bool,
    diff_l1: f64,
    ranks: Vec<NodeRank>,
}

#[derive(Serialize)]
struct NodeRank {
    node: usize,
    label: String,
    rank: f64,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let graph = build_graph(cli)?;
    match &cli.command {
        None => rank(cli, &graph),
        Some(Command::Show) => {
            print!("{}", graph.describe());
            Ok(())
        }
        Some(Command::Bridge { from, to }) => {
            println!("{}", bridge_message(&graph, from, to)?);
            Ok(())
        }
        Some(Command::Generate { text, seed }) => {
            println!("{}", graph.bridge_text(text, seed_or_random(*seed)));
            Ok(())
        }
        Some(Command::Path { from, to }) => {
            println!("{}", path_message(&graph, from, to)?);
            Ok(())
        }
        Some(Command::Walk { start, seed, out }) => {
            walk(&graph, start.as_deref(), *seed, out.as_deref())
        }
    }
}

fn rank(cli: &Cli, graph: &WordGraph) -> Result<()> {
    let config = PageRankConfig {
        damping: cli.damping,
        max_iterations: cli.max_iterations,
        tolerance: cli.tolerance,
        dangling: cli.dangling.into(),
    };
    let run = pagerank_checked_run(graph, config).context("cannot rank graph")?;

    let scores = if cli.normalize {
        normalize(&run.scores)
    } else {
        run.scores.clone()
    };
    let rows: Vec<(usize, f64)> = if !cli.words.is_empty() {
        let words: Vec<&str> = cli.words.iter().map(String::as_str).collect();
        graph
            .lookup(&words)?
            .into_iter()
            .map(|node| (node, scores[node]))
            .collect()
    } else {
        match cli.top {
            Some(k) => top_k(&scores, k),
            None => scores.iter().copied().enumerate().collect(),
        }
    };

    if cli.json {
        let report = Report {
            iterations: run.iterations,
            converged: run.converged,
            diff_l1: run.diff_l1,
            ranks: rows
                .into_iter()
                .map(|(node, rank)| NodeRank {
                    node,
                    label: graph.label(node).to_string(),
                    rank,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if run.converged {
        println!("Converged after {} iterations.", run.iterations);
    }
    for (node, rank) in rows {
        println!("Node {}: {rank:.prec$}", graph.label(node), prec = cli.precision);
    }
    Ok(())
}

fn bridge_message(graph: &WordGraph, from: &str, to: &str) -> Result<String> {
    let bridges = graph.bridge_words(from, to)?;
    Ok(match bridges.as_slice() {
        [] => format!("No bridge words from \"{from}\" to \"{to}\"!"),
        [one] => format!("The bridge word from \"{from}\" to \"{to}\" is: \"{one}\""),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(|w| format!("\"{w}\"")).collect();
            format!(
                "The bridge words from \"{from}\" to \"{to}\" are: {} and \"{last}\"",
                init.join(", ")
            )
        }
    })
}

fn path_message(graph: &WordGraph, from: &str, to: &str) -> Result<String> {
    let ends = graph.lookup(&[from, to])?;
    Ok(match shortest_path(graph, ends[0], ends[1])? {
        Some(path) => {
            let labels: Vec<&str> = path.nodes.iter().map(|&n| graph.label(n)).collect();
            format!("Path: {}\nLength: {}", labels.join(" -> "), path.length)
        }
        None => format!("No path exists between \"{from}\" and \"{to}\""),
    })
}

fn walk(
    graph: &WordGraph,
    start: Option<&str>,
    seed: Option<u64>,
    out: Option<&Path>,
) -> Result<()> {
    let start = match start {
        Some(label) => Some(graph.lookup(&[label])?[0]),
        None => None,
    };
    let nodes = random_walk(graph, start, seed_or_random(seed))?;
    let line = nodes
        .iter()
        .map(|&n| graph.label(n))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    if let Some(path) = out {
        fs::write(path, &line).with_context(|| format!("cannot write {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved random walk");
    }
    Ok(())
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::debug!(seed, "rng seed");
    seed
}

fn build_graph(cli: &Cli) -> Result<WordGraph> {
    if let Some(path) = &cli.text {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        return Ok(WordGraph::from_text(&text));
    }
    let graph = match cli.nodes {
        Some(n) => Graph::from_edges(n, cli.edges.iter().copied())
            .with_context(|| format!("invalid edge for a {n}-node graph"))?,
        None => Graph::from_edges(
            SAMPLE_NODES,
            SAMPLE_EDGES.iter().map(|&(u, v)| (u, v, 1.0)),
        )
        .context("invalid demo graph")?,
    };
    Ok(WordGraph::numbered(graph))
}

fn parse_edge(s: &str) -> std::result::Result<(usize, usize, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [from, to, weight] = parts.as_slice() else {
        return Err(format!("expected FROM:TO:WEIGHT, got '{s}'"));
    };
    let node = |field: &str, raw: &str| {
        raw.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid {field} node index '{raw}' (must be a non-negative integer)"))
    };
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid weight '{weight}'"))?;
    Ok((node("source", *from)?, node("target", *to)?, weight))
}
