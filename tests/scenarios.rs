use fastbc::brandes::{ExhaustivePivotSelector, UnitScaling};
use fastbc::config::{self, Config};
use fastbc::data::edge_list::parse_edge_list;
use fastbc::louvain::{LouvainEvaluator, SingleCommunityEvaluator};
use fastbc::{ClusteredBrandesBc, FastBcError, WeightedGraph};

const EPS: f64 = 1e-9;

fn exact_engine() -> ClusteredBrandesBc {
    ClusteredBrandesBc::new(Box::new(SingleCommunityEvaluator))
        .with_pivot_selector(Box::new(ExhaustivePivotSelector))
        .with_scaling(Box::new(UnitScaling))
}

/// Two dense groups of five joined through a single corridor vertex
fn barbell() -> WeightedGraph {
    let mut text = String::new();
    for group in [["a1", "a2", "a3", "a4", "a5"], ["b1", "b2", "b3", "b4", "b5"]] {
        for src in &group {
            for dst in &group {
                if src != dst {
                    text.push_str(&format!("{} {} 1\n", src, dst));
                }
            }
        }
    }
    text.push_str("a5 bridge 1\nbridge a5 1\nbridge b1 1\nb1 bridge 1\n");
    parse_edge_list(&text).unwrap()
}

#[test]
fn triangle_middle_vertex_carries_the_shortcut() {
    let graph = parse_edge_list("A B 1\nB C 1\nA C 3\n").unwrap();
    let bc = exact_engine().compute_bc(&graph).unwrap();

    assert_eq!(bc.len(), 3);
    assert!(bc[1] > 0.0);
    assert!((bc[1] - 1.0).abs() < EPS);
    assert_eq!(bc[0], 0.0);
    assert_eq!(bc[2], 0.0);
}

#[test]
fn exact_config_flag_reproduces_the_triangle() {
    let graph = parse_edge_list("A B 1\nB C 1\nA C 3\n").unwrap();
    let engine = Config { exact: true, ..Config::default() }.build_engine().unwrap();
    let bc = engine.compute_bc(&graph).unwrap();
    assert_eq!(bc.to_vec(), vec![0.0, 1.0, 0.0]);
}

#[test]
fn duplicate_seeds_fail_before_processing() {
    let err = config::resolve_seeds(Some("5,9,5"), Some(3)).unwrap_err();
    assert!(matches!(err, FastBcError::Configuration(_)));
    assert!(!err.is_internal());

    let err = LouvainEvaluator::new(vec![5, 9, 5], 3, 0.01).unwrap_err();
    assert!(matches!(err, FastBcError::Configuration(_)));

    let err = Config::new(vec![5, 5], 0.01).build_engine().unwrap_err();
    assert!(matches!(err, FastBcError::Configuration(_)));
}

#[test]
fn isolated_vertex_scores_zero() {
    let mut adjacency = vec![vec![(1, 1.0)], vec![(2, 1.0)], vec![], vec![]];
    adjacency[2].push((0, 2.0));
    let graph = WeightedGraph::from_adjacency(adjacency, None);

    let engine = Config::new(vec![1, 2, 3], 0.01).build_engine().unwrap();
    let bc = engine.compute_bc(&graph).unwrap();

    assert_eq!(bc.len(), 4);
    assert_eq!(bc[3], 0.0);
    assert!(bc.iter().all(|v| v.is_finite()));
}

#[test]
fn fixed_seeds_are_deterministic() {
    let graph = barbell();
    let engine = Config::new(vec![17, 4, 99, 1234], 0.01).build_engine().unwrap();

    let first = engine.compute_report(&graph).unwrap();
    let second = engine.compute_report(&graph).unwrap();

    assert_eq!(first.scores, second.scores);
    assert_eq!(first.seed, second.seed);
    assert_eq!(first.modularity, second.modularity);
}

#[test]
fn corridor_vertex_ranks_highest() {
    let graph = barbell();
    let bridge = graph
        .node_ids
        .as_ref()
        .and_then(|ids| ids.iter().position(|id| id == "bridge"))
        .unwrap();

    let exact = exact_engine().compute_bc(&graph).unwrap();
    let top = exact
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(top, bridge);

    let approx = Config {
        pivots_per_cluster: 2,
        ..Config::new(vec![1, 2], 0.001)
    }
    .build_engine()
    .unwrap()
    .compute_bc(&graph)
    .unwrap();
    assert_eq!(approx.len(), graph.node_count());
    assert!(approx.iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn approximation_finds_two_communities_in_the_barbell() {
    let graph = barbell();
    let engine = Config::new(vec![3, 8], 0.0001).build_engine().unwrap();
    let report = engine.compute_report(&graph).unwrap();

    assert!(report.community_count >= 2);
    assert!(report.modularity > 0.3);
    assert_eq!(report.cluster_sizes.iter().sum::<usize>(), graph.node_count());
    assert_eq!(report.pivot_count, report.community_count);
}

#[test]
fn seed_list_order_does_not_change_the_scores() {
    let graph = barbell();
    let (forward, executors) = config::resolve_seeds(Some("5,9,1234"), Some(3)).unwrap();
    let (backward, _) = config::resolve_seeds(Some("1234 9 5"), Some(3)).unwrap();

    let first = Config::new(forward, 0.01).build_engine().unwrap().compute_report(&graph).unwrap();
    let second = Config::new(backward, 0.01).build_engine().unwrap().compute_report(&graph).unwrap();

    assert_eq!(executors, 3);
    assert_eq!(first.seed, second.seed);
    assert_eq!(first.scores, second.scores);
}
