//! Property checks on seeded random graphs

use campus_route::graph::Connection;
use campus_route::verify::{check_route, verify_random_queries};
use campus_route::{find_shortest_path, CampusGraph, CostMetric, GraphLimits, VertexId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GRAPHS: u64 = 60;

fn random_graph(rng: &mut StdRng) -> (Vec<VertexId>, Vec<Connection>) {
    let n = rng.random_range(2..=7u32);
    // Sparse, shuffled-looking ids so dense indices never equal ids.
    let vertices: Vec<VertexId> = (0..n).map(|i| i * 3 + 5).collect();
    let mut connections = Vec::new();
    for (i, &a) in vertices.iter().enumerate() {
        for &b in &vertices[i + 1..] {
            if rng.random_bool(0.45) {
                connections.push(Connection {
                    start: a,
                    end: b,
                    distance: rng.random_range(1.0..100.0),
                    time: rng.random_range(0.5..10.0),
                });
            }
        }
    }
    (vertices, connections)
}

/// Cheapest simple-path cost by exhaustive DFS.
fn brute_force(
    graph: &CampusGraph,
    at: VertexId,
    end: VertexId,
    metric: CostMetric,
    visited: &mut Vec<VertexId>,
) -> Option<f64> {
    if at == end {
        return Some(0.0);
    }
    visited.push(at);
    let mut best: Option<f64> = None;
    let neighbors: Vec<_> = graph.neighbors(at).unwrap().collect();
    for (next, weights) in neighbors {
        if visited.contains(&next) {
            continue;
        }
        let w = metric.weight_fn()(&weights);
        if let Some(rest) = brute_force(graph, next, end, metric, visited) {
            let cost = w + rest;
            best = Some(best.map_or(cost, |b: f64| b.min(cost)));
        }
    }
    visited.pop();
    best
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn routes_are_optimal_valid_and_symmetric() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..GRAPHS {
        let (vertices, connections) = random_graph(&mut rng);
        let graph =
            CampusGraph::from_connections(vertices.iter().copied(), &connections, GraphLimits::default())
                .unwrap();

        for &s in &vertices {
            for &t in &vertices {
                for metric in CostMetric::ALL {
                    let r = find_shortest_path(&graph, s, t, metric).unwrap();
                    let expected = brute_force(&graph, s, t, metric, &mut Vec::new());

                    match expected {
                        None => assert!(!r.is_found(), "{s}->{t} should be unreachable"),
                        Some(cost) => {
                            assert!(r.is_found(), "{s}->{t} should be reachable");
                            assert!(
                                close(r.total(metric), cost),
                                "{s}->{t} by {metric}: {} vs brute force {cost}",
                                r.total(metric)
                            );
                        }
                    }
                    check_route(&graph, s, t, &r).unwrap();

                    let back = find_shortest_path(&graph, t, s, metric).unwrap();
                    let mut reversed = back.path.clone();
                    reversed.reverse();
                    assert_eq!(reversed, r.path, "{s}->{t} by {metric}");
                    assert!(close(back.total_distance, r.total_distance));
                    assert!(close(back.total_time, r.total_time));
                }
            }
        }
    }
}

#[test]
fn route_never_revisits_a_location() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..GRAPHS {
        let (vertices, connections) = random_graph(&mut rng);
        let graph =
            CampusGraph::from_connections(vertices.iter().copied(), &connections, GraphLimits::default())
                .unwrap();
        let (s, t) = (vertices[0], vertices[vertices.len() - 1]);
        let r = find_shortest_path(&graph, s, t, CostMetric::Time).unwrap();
        let mut seen = r.path.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), r.path.len());
    }
}

#[test]
fn campus_graph_passes_random_verification() {
    let store = campus_route::LocationStore::builtin().unwrap();
    let graph = store.graph(GraphLimits::default()).unwrap();
    let report = verify_random_queries(&graph, 300, 2024).unwrap();
    assert_eq!(report.queries, 600);
    assert_eq!(report.unreachable, 0);
    assert!(report.passed(), "{:?}", report.mismatches);
}
