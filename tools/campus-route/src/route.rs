//! Shortest walking route between two campus locations (Dijkstra)

use std::cmp::{Ordering, Reverse};

use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RouteError;
use crate::graph::{CampusGraph, EdgeWeights, VertexId};
use crate::metric::CostMetric;

/// Outcome of a route query.
///
/// An empty `path` means the destination is unreachable; totals are then 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    /// Location ids from start to end, inclusive
    #[schema(value_type = Vec<u32>, example = json!([0, 1, 11]))]
    pub path: Vec<VertexId>,
    /// Sum of walkway distances along `path`, in meters
    #[schema(example = 450.0)]
    pub total_distance: f64,
    /// Sum of walkway times along `path`, in minutes
    #[schema(example = 6.0)]
    pub total_time: f64,
}

impl RouteResult {
    pub fn unreachable() -> Self {
        Self {
            path: Vec::new(),
            total_distance: 0.0,
            total_time: 0.0,
        }
    }

    pub fn trivial(at: VertexId) -> Self {
        Self {
            path: vec![at],
            total_distance: 0.0,
            total_time: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Total under the given metric.
    pub fn total(&self, metric: CostMetric) -> f64 {
        match metric {
            CostMetric::Distance => self.total_distance,
            CostMetric::Time => self.total_time,
        }
    }
}

/// Path cost under the selected metric, then under its tie-break metric.
/// Ordered lexicographically; weights are validated finite on graph
/// construction, so `total_cmp` agrees with numeric order here.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost(f64, f64);

impl Cost {
    const ZERO: Cost = Cost(0.0, 0.0);
    const INFINITE: Cost = Cost(f64::INFINITY, f64::INFINITY);
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .total_cmp(&other.0)
            .then_with(|| self.1.total_cmp(&other.1))
    }
}

/// Frontier priority: lowest cost first, then earliest insertion.
type FrontierKey = Reverse<(Cost, u64)>;

/// Find the cheapest route from `start` to `end` under `metric`.
///
/// Routes of equal cost are ranked by the other metric, so both totals of
/// `start -> end` and `end -> start` agree. Both totals of the result are
/// accumulated along the returned path, whichever metric drove the search.
pub fn find_shortest_path(
    graph: &CampusGraph,
    start: VertexId,
    end: VertexId,
    metric: CostMetric,
) -> Result<RouteResult, RouteError> {
    let source = graph
        .index_of(start)
        .ok_or(RouteError::UnknownVertex(start))?;
    let target = graph.index_of(end).ok_or(RouteError::UnknownVertex(end))?;

    if source == target {
        return Ok(RouteResult::trivial(start));
    }

    #[cfg(debug_assertions)]
    graph.validate()?;

    let primary = metric.weight_fn();
    let secondary = metric.tie_break().weight_fn();
    let n = graph.vertex_count();

    let mut cost = vec![Cost::INFINITE; n];
    let mut parent: Vec<Option<(usize, EdgeWeights)>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut frontier: PriorityQueue<usize, FrontierKey> = PriorityQueue::new();
    let mut sequence = 0u64;
    let mut settled_count = 0usize;

    cost[source] = Cost::ZERO;
    frontier.push(source, Reverse((Cost::ZERO, sequence)));

    while let Some((u, Reverse((d, _)))) = frontier.pop() {
        if settled[u] || d > cost[u] {
            continue; // Stale entry
        }
        settled[u] = true;
        settled_count += 1;

        if u == target {
            break;
        }

        for link in graph.links(u) {
            let v = link.target;
            if settled[v] {
                continue;
            }
            let candidate = Cost(d.0 + primary(&link.weights), d.1 + secondary(&link.weights));
            if candidate < cost[v] {
                cost[v] = candidate;
                parent[v] = Some((u, link.weights));
                sequence += 1;
                frontier.push(v, Reverse((candidate, sequence)));
            }
        }
    }

    tracing::debug!(
        start,
        end,
        %metric,
        settled = settled_count,
        reached = settled[target],
        "route search finished"
    );

    if !settled[target] {
        return Ok(RouteResult::unreachable());
    }

    let mut path = vec![end];
    let mut legs = Vec::new();
    let mut current = target;
    while let Some((prev, weights)) = parent[current] {
        path.push(graph.id_at(prev));
        legs.push(weights);
        current = prev;
    }
    path.reverse();
    legs.reverse();

    let (total_distance, total_time) = legs
        .iter()
        .fold((0.0, 0.0), |(d, t), w| (d + w.distance, t + w.time));

    Ok(RouteResult {
        path,
        total_distance,
        total_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Connection, GraphLimits};

    fn graph(vertices: &[VertexId], edges: &[(VertexId, VertexId, f64, f64)]) -> CampusGraph {
        let connections: Vec<Connection> = edges
            .iter()
            .map(|&(start, end, distance, time)| Connection {
                start,
                end,
                distance,
                time,
            })
            .collect();
        CampusGraph::from_connections(vertices.iter().copied(), &connections, GraphLimits::default())
            .unwrap()
    }

    /// ```text
    ///   0 --300/4-- 1 --150/2-- 11
    ///   |                       |
    ///   +--500/6-- 10 --200/3---+
    /// ```
    fn north_gate_corner() -> CampusGraph {
        graph(
            &[0, 1, 10, 11],
            &[
                (0, 1, 300.0, 4.0),
                (0, 10, 500.0, 6.0),
                (1, 11, 150.0, 2.0),
                (10, 11, 200.0, 3.0),
            ],
        )
    }

    #[test]
    fn picks_shorter_branch_and_reports_both_totals() {
        let g = north_gate_corner();
        let r = find_shortest_path(&g, 0, 11, CostMetric::Distance).unwrap();
        assert_eq!(r.path, vec![0, 1, 11]);
        assert_eq!(r.total_distance, 450.0);
        assert_eq!(r.total_time, 6.0);
    }

    #[test]
    fn same_start_and_end_is_trivial() {
        let g = north_gate_corner();
        let r = find_shortest_path(&g, 10, 10, CostMetric::Time).unwrap();
        assert_eq!(r, RouteResult::trivial(10));
    }

    #[test]
    fn unknown_vertices_are_errors() {
        let g = north_gate_corner();
        assert_eq!(
            find_shortest_path(&g, 99, 11, CostMetric::Distance),
            Err(RouteError::UnknownVertex(99))
        );
        assert_eq!(
            find_shortest_path(&g, 0, 98, CostMetric::Distance),
            Err(RouteError::UnknownVertex(98))
        );
    }

    #[test]
    fn disconnected_target_yields_empty_path() {
        let g = graph(&[0, 1, 2], &[(0, 1, 10.0, 1.0)]);
        let r = find_shortest_path(&g, 0, 2, CostMetric::Distance).unwrap();
        assert!(!r.is_found());
        assert_eq!(r, RouteResult::unreachable());
    }

    #[test]
    fn metric_changes_the_route() {
        // Short but slow through 1, long but fast through 2.
        let g = graph(
            &[0, 1, 2, 3],
            &[
                (0, 1, 100.0, 10.0),
                (1, 3, 100.0, 10.0),
                (0, 2, 150.0, 3.0),
                (2, 3, 150.0, 3.0),
            ],
        );
        let by_distance = find_shortest_path(&g, 0, 3, CostMetric::Distance).unwrap();
        let by_time = find_shortest_path(&g, 0, 3, CostMetric::Time).unwrap();
        assert_eq!(by_distance.path, vec![0, 1, 3]);
        assert_eq!(by_time.path, vec![0, 2, 3]);
        assert_eq!(by_distance.total_time, 20.0);
        assert_eq!(by_time.total_distance, 300.0);
    }

    #[test]
    fn equal_cost_routes_prefer_the_cheaper_tie_break() {
        // Same distance both ways; the route through 2 is faster.
        let g = graph(
            &[0, 1, 2, 3],
            &[
                (0, 1, 100.0, 5.0),
                (1, 3, 100.0, 5.0),
                (0, 2, 100.0, 2.0),
                (2, 3, 100.0, 2.0),
            ],
        );
        let there = find_shortest_path(&g, 0, 3, CostMetric::Distance).unwrap();
        let back = find_shortest_path(&g, 3, 0, CostMetric::Distance).unwrap();
        assert_eq!(there.path, vec![0, 2, 3]);
        assert_eq!(back.path, vec![3, 2, 0]);
        assert_eq!(there.total_time, 4.0);
        assert_eq!(back.total_time, 4.0);
    }

    #[test]
    fn weights_near_the_cap_still_route() {
        let limits = GraphLimits {
            max_vertices: 3,
            max_edges: 2,
        };
        let w = limits.max_weight();
        let connections = [
            Connection {
                start: 0,
                end: 1,
                distance: w,
                time: 1.0,
            },
            Connection {
                start: 1,
                end: 2,
                distance: w,
                time: 1.0,
            },
        ];
        let g = CampusGraph::from_connections([0, 1, 2], &connections, limits).unwrap();
        let r = find_shortest_path(&g, 0, 2, CostMetric::Distance).unwrap();
        assert_eq!(r.path, vec![0, 1, 2]);
        assert!(r.total_distance.is_finite());

        let overflowing = [
            Connection {
                distance: f64::MAX,
                ..connections[0]
            },
            Connection {
                distance: f64::MAX,
                ..connections[1]
            },
        ];
        assert!(matches!(
            CampusGraph::from_connections([0, 1, 2], &overflowing, limits),
            Err(RouteError::MalformedGraph(_))
        ));
    }

    #[test]
    fn equal_cost_ties_are_reproducible() {
        // Two equal-cost routes; the one discovered first wins every time.
        let g = graph(
            &[0, 1, 2, 3],
            &[
                (0, 1, 1.0, 1.0),
                (0, 2, 1.0, 1.0),
                (1, 3, 1.0, 1.0),
                (2, 3, 1.0, 1.0),
            ],
        );
        let first = find_shortest_path(&g, 0, 3, CostMetric::Distance).unwrap();
        assert_eq!(first.path, vec![0, 1, 3]);
        for _ in 0..20 {
            assert_eq!(find_shortest_path(&g, 0, 3, CostMetric::Distance).unwrap(), first);
        }
    }

    #[test]
    fn serializes_with_camel_case_totals() {
        let r = RouteResult {
            path: vec![0, 1, 11],
            total_distance: 450.0,
            total_time: 6.0,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"path": [0, 1, 11], "totalDistance": 450.0, "totalTime": 6.0})
        );
    }
}
