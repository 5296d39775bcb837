//! Route correctness verification
//!
//! Fast-fail checks for the route engine:
//! - Returned paths start and end where asked and follow real walkways
//! - Reported totals equal the sums along the path
//! - Optimized cost equals an independent Bellman-Ford reference

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::RouteError;
use crate::graph::{CampusGraph, VertexId};
use crate::metric::CostMetric;
use crate::route::{find_shortest_path, RouteResult};

/// Relative tolerance when comparing floating-point path costs.
const COST_TOLERANCE: f64 = 1e-9;

/// Cheapest cost from `start` to `end` by Bellman-Ford relaxation, or `None`
/// when unreachable. Slow; meant only as a reference.
pub fn reference_cost(
    graph: &CampusGraph,
    start: VertexId,
    end: VertexId,
    metric: CostMetric,
) -> Result<Option<f64>, RouteError> {
    let source = graph
        .index_of(start)
        .ok_or(RouteError::UnknownVertex(start))?;
    let target = graph.index_of(end).ok_or(RouteError::UnknownVertex(end))?;

    let weight = metric.weight_fn();
    let edges: Vec<(usize, usize, f64)> = graph
        .edges()
        .filter_map(|(a, b, w)| Some((graph.index_of(a)?, graph.index_of(b)?, weight(&w))))
        .collect();

    let mut cost = vec![f64::INFINITY; graph.vertex_count()];
    cost[source] = 0.0;

    for _ in 1..graph.vertex_count().max(2) {
        let mut changed = false;
        for &(a, b, w) in &edges {
            if cost[a] + w < cost[b] {
                cost[b] = cost[a] + w;
                changed = true;
            }
            if cost[b] + w < cost[a] {
                cost[a] = cost[b] + w;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    Ok(cost[target].is_finite().then_some(cost[target]))
}

/// Check the structural invariants of a route result.
pub fn check_route(
    graph: &CampusGraph,
    start: VertexId,
    end: VertexId,
    result: &RouteResult,
) -> Result<(), String> {
    let Some((&first, _)) = result.path.split_first() else {
        if result.total_distance != 0.0 || result.total_time != 0.0 {
            return Err("empty path with non-zero totals".to_string());
        }
        return Ok(());
    };
    let last = result.path[result.path.len() - 1];

    if first != start {
        return Err(format!("path starts at {first}, expected {start}"));
    }
    if last != end {
        return Err(format!("path ends at {last}, expected {end}"));
    }

    let mut distance = 0.0;
    let mut time = 0.0;
    for pair in result.path.windows(2) {
        let w = graph
            .edge(pair[0], pair[1])
            .ok_or_else(|| format!("no walkway between {} and {}", pair[0], pair[1]))?;
        distance += w.distance;
        time += w.time;
    }

    if !approx_eq(distance, result.total_distance) {
        return Err(format!(
            "total distance {} != path sum {}",
            result.total_distance, distance
        ));
    }
    if !approx_eq(time, result.total_time) {
        return Err(format!(
            "total time {} != path sum {}",
            result.total_time, time
        ));
    }
    Ok(())
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= COST_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// One failed verification query
#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    pub start: VertexId,
    pub end: VertexId,
    pub metric: CostMetric,
    pub reason: String,
}

/// Verification results
#[derive(Debug, Default, Serialize)]
pub struct VerificationReport {
    pub queries: usize,
    pub unreachable: usize,
    pub mismatches: Vec<Mismatch>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Run `samples` random start/end pairs under every metric and compare the
/// engine against the reference.
pub fn verify_random_queries(
    graph: &CampusGraph,
    samples: usize,
    seed: u64,
) -> Result<VerificationReport, RouteError> {
    let vertices: Vec<VertexId> = graph.vertices().collect();
    let mut report = VerificationReport::default();
    if vertices.is_empty() {
        return Ok(report);
    }

    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..samples {
        let start = vertices[rng.random_range(0..vertices.len())];
        let end = vertices[rng.random_range(0..vertices.len())];

        for metric in CostMetric::ALL {
            report.queries += 1;
            let result = find_shortest_path(graph, start, end, metric)?;
            let expected = reference_cost(graph, start, end, metric)?;

            let reason = match (expected, result.is_found()) {
                (None, false) => {
                    report.unreachable += 1;
                    None
                }
                (None, true) => Some("route found but reference says unreachable".to_string()),
                (Some(cost), false) => Some(format!("no route but reference cost is {cost}")),
                (Some(cost), true) => check_route(graph, start, end, &result)
                    .err()
                    .or_else(|| {
                        let actual = result.total(metric);
                        (!approx_eq(actual, cost))
                            .then(|| format!("cost {actual} but reference cost is {cost}"))
                    }),
            };

            if let Some(reason) = reason {
                tracing::warn!(start, end, %metric, %reason, "route verification mismatch");
                report.mismatches.push(Mismatch {
                    start,
                    end,
                    metric,
                    reason,
                });
            }
        }
    }

    tracing::info!(
        queries = report.queries,
        unreachable = report.unreachable,
        mismatches = report.mismatches.len(),
        "route verification finished"
    );

    Ok(report)
}
