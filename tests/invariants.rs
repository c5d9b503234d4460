use graphrank::{
    normalize, pagerank_checked_run, pagerank_observed, top_k, DanglingPolicy, Error, Graph,
    PageRankConfig,
};

fn assert_prob_like(xs: &[f64]) {
    assert!(!xs.is_empty());
    for &x in xs {
        assert!(x.is_finite(), "non-finite score: {x}");
        assert!(x > 0.0, "non-positive score: {x}");
    }
    let s: f64 = xs.iter().copied().sum();
    assert!((s - 1.0).abs() <= 1e-9 * xs.len() as f64, "sum={s} not ~1");
}

/// Ten nodes: two paths from 0 merging at 5, a 5 -> 6 -> 9 -> 5 loop, 5 -> 8 -> 0
/// back to the start, and 7 as a sink.
fn sample_graph() -> Graph {
    let edges = [
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
    Graph::from_edges(10, edges.iter().map(|&(u, v)| (u, v, 1.0))).unwrap()
}

#[test]
fn sample_graph_converges_with_uniform_dangling() {
    let g = sample_graph();
    let config = PageRankConfig::default().with_dangling(DanglingPolicy::Uniform);
    let run = pagerank_checked_run(&g, config).unwrap();
    assert!(run.converged);
    assert!(run.iterations < 100, "iterations={}", run.iterations);
    assert!(run.diff_l1 < 1e-6);
    assert_eq!(run.scores.len(), 10);
    assert_prob_like(&run.scores);
}

#[test]
fn sample_graph_default_config_ranks() {
    let g = sample_graph();
    let run = pagerank_checked_run(&g, PageRankConfig::default()).unwrap();
    assert!(run.converged);
    assert_eq!(run.iterations, 45);

    let expected = [
        0.065994, 0.043048, 0.043048, 0.051590, 0.051590, 0.158799, 0.059993, 0.059993, 0.059993,
        0.065994,
    ];
    for (i, (got, want)) in run.scores.iter().zip(expected).enumerate() {
        assert_eq!(format!("{got:.6}"), format!("{want:.6}"), "node {i}");
    }

    // Node 7 is a sink, so dropped mass leaves the total below 1.
    assert!(run.scores.iter().all(|&x| x > 0.0));
    let total: f64 = run.scores.iter().sum();
    assert!(total < 1.0, "sum={total}");
    assert_prob_like(&normalize(&run.scores));

    let top: Vec<usize> = top_k(&run.scores, 2).into_iter().map(|(i, _)| i).collect();
    assert_eq!(top, vec![5, 0]);
}

#[test]
fn sample_graph_uniform_dangling_conserves_every_step() {
    let g = sample_graph();
    let config = PageRankConfig::default().with_dangling(DanglingPolicy::Uniform);
    let mut steps = 0usize;
    pagerank_observed(&g, config, |it| {
        if it.iteration == 0 {
            assert!(it.scores.iter().all(|&x| x == 1.0 / 10.0));
        }
        let s: f64 = it.scores.iter().sum();
        assert!((s - 1.0).abs() <= 1e-9 * 10.0, "iteration {}: sum={s}", it.iteration);
        steps += 1;
    })
    .unwrap();
    assert!(steps > 1);
}

#[test]
fn delta_trends_to_zero_on_strongly_connected_graph() {
    // 0 -> 1 -> 2 -> 3 -> 0 with a 1 -> 3 shortcut and 3 -> 1 back edge.
    let g = Graph::from_edges(
        4,
        [
            (0, 1, 1.0),
            (1, 2, 2.0),
            (1, 3, 1.0),
            (2, 3, 1.0),
            (3, 0, 1.0),
            (3, 1, 0.5),
        ],
    )
    .unwrap();
    let mut diffs = Vec::new();
    let run = pagerank_observed(&g, PageRankConfig::default(), |it| {
        if let Some(d) = it.diff_l1 {
            diffs.push(d);
        }
    })
    .unwrap();
    assert!(run.converged);
    assert_prob_like(&run.scores);
    let first = diffs[0];
    let last = *diffs.last().unwrap();
    assert!(last < first * 1e-3, "first={first} last={last}");
}

#[test]
fn zero_node_graph_is_trivially_converged() {
    let g = Graph::new(0);
    let run = pagerank_checked_run(&g, PageRankConfig::default()).unwrap();
    assert!(run.scores.is_empty());
    assert_eq!(run.iterations, 0);
    assert!(run.converged);
}

#[test]
fn solves_are_bit_identical() {
    let g = sample_graph();
    let a = pagerank_checked_run(&g, PageRankConfig::default()).unwrap();
    let b = pagerank_checked_run(&g, PageRankConfig::default()).unwrap();
    let a: Vec<u64> = a.scores.iter().map(|x| x.to_bits()).collect();
    let b: Vec<u64> = b.scores.iter().map(|x| x.to_bits()).collect();
    assert_eq!(a, b);
}

#[test]
fn invalid_inputs_are_typed_errors() {
    let g = sample_graph();
    for config in [
        PageRankConfig::default().with_damping(1.5),
        PageRankConfig::default().with_max_iterations(0),
        PageRankConfig::default().with_tolerance(-1.0),
    ] {
        assert!(matches!(
            pagerank_checked_run(&g, config),
            Err(Error::InvalidConfig(_))
        ));
    }

    let mut g = Graph::new(10);
    assert!(matches!(
        g.add_edge(0, 10, 1.0),
        Err(Error::OutOfRangeNode { node: 10, node_count: 10 })
    ));
    assert!(matches!(
        g.add_edge(10, 0, 1.0),
        Err(Error::OutOfRangeNode { node: 10, .. })
    ));
    assert!(matches!(
        g.add_edge(0, 1, -1.0),
        Err(Error::InvalidWeight { .. })
    ));
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn word_graph_feeds_the_solver() {
    let g = graphrank::WordGraph::from_text(
        "The scientist carefully analyzed the data, wrote a detailed report, and shared the report with the team.",
    );
    let run = pagerank_checked_run(&g, PageRankConfig::default()).unwrap();
    assert!(run.converged);
    assert_eq!(run.scores.len(), g.labels().len());
    // "analyzed", "shared" and "with" pass all of their rank to "the".
    let (best, _) = top_k(&run.scores, 1)[0];
    assert_eq!(g.label(best), "the");
    assert_eq!(g.rank_of(&run.scores, "the").unwrap(), run.scores[best]);
}
