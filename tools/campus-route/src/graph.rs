//! Undirected campus walkway graph
//!
//! Every walkway is stored once per direction, but edges can only be added as
//! a pair, so the adjacency relation is symmetric by construction. Graphs that
//! arrive in adjacency-list form (`AdjacencyGraph`) are validated on import.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GraphDefect, RouteError};

/// Identifier of a campus location.
pub type VertexId = u32;

/// Weights of one walkway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeights {
    /// Meters
    pub distance: f64,
    /// Minutes
    pub time: f64,
}

impl EdgeWeights {
    pub fn new(distance: f64, time: f64) -> Self {
        Self { distance, time }
    }

    /// Both weights finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.distance.is_finite() && self.time.is_finite() && self.distance > 0.0 && self.time > 0.0
    }
}

/// Flat undirected walkway record, as stored in datasets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub start: VertexId,
    pub end: VertexId,
    pub distance: f64,
    pub time: f64,
}

impl Connection {
    pub fn weights(&self) -> EdgeWeights {
        EdgeWeights::new(self.distance, self.time)
    }
}

/// Upper bounds applied to every constructed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLimits {
    pub max_vertices: usize,
    pub max_edges: usize,
}

impl GraphLimits {
    /// Largest accepted edge weight. A simple path has at most `max_edges`
    /// edges, so no path cost can overflow to infinity.
    pub fn max_weight(&self) -> f64 {
        f64::MAX / (self.max_edges as f64 + 1.0)
    }
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_vertices: 10_000,
            max_edges: 100_000,
        }
    }
}

/// One adjacency entry of the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    pub vertex: VertexId,
    pub distance: f64,
    pub time: f64,
}

/// Wire form of a graph: vertex list plus per-vertex adjacency lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacencyGraph {
    pub vertices: Vec<VertexId>,
    pub adjacency_list: BTreeMap<VertexId, Vec<AdjacencyEntry>>,
}

/// Directed half of an undirected edge, addressed by dense vertex index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Link {
    pub target: usize,
    pub weights: EdgeWeights,
}

/// Immutable undirected graph of campus locations.
#[derive(Debug, Clone)]
pub struct CampusGraph {
    ids: Vec<VertexId>,
    index: HashMap<VertexId, usize>,
    adjacency: Vec<Vec<Link>>,
    edge_count: usize,
}

/// Incremental, validating constructor for `CampusGraph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    limits: GraphLimits,
    ids: Vec<VertexId>,
    index: HashMap<VertexId, usize>,
    adjacency: Vec<Vec<Link>>,
    pairs: HashSet<(VertexId, VertexId)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: GraphLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn add_vertex(&mut self, id: VertexId) -> Result<&mut Self, RouteError> {
        if self.index.contains_key(&id) {
            return Err(GraphDefect::DuplicateVertex(id).into());
        }
        if self.ids.len() >= self.limits.max_vertices {
            return Err(RouteError::LimitExceeded {
                what: "vertices",
                count: self.ids.len() + 1,
                limit: self.limits.max_vertices,
            });
        }
        self.index.insert(id, self.ids.len());
        self.ids.push(id);
        self.adjacency.push(Vec::new());
        Ok(self)
    }

    /// Add the undirected edge `a -- b`; both directions are inserted together.
    pub fn add_edge(
        &mut self,
        a: VertexId,
        b: VertexId,
        weights: EdgeWeights,
    ) -> Result<&mut Self, RouteError> {
        if a == b {
            return Err(GraphDefect::SelfLoop(a).into());
        }
        let max_weight = self.limits.max_weight();
        if !weights.is_valid() || weights.distance > max_weight || weights.time > max_weight {
            return Err(GraphDefect::InvalidWeight {
                from: a,
                to: b,
                distance: weights.distance,
                time: weights.time,
            }
            .into());
        }
        let (ia, ib) = match (self.index.get(&a), self.index.get(&b)) {
            (Some(&ia), Some(&ib)) => (ia, ib),
            _ => return Err(GraphDefect::DanglingEdge { from: a, to: b }.into()),
        };
        let pair = (a.min(b), a.max(b));
        if self.pairs.contains(&pair) {
            return Err(GraphDefect::DuplicateEdge { from: a, to: b }.into());
        }
        if self.pairs.len() >= self.limits.max_edges {
            return Err(RouteError::LimitExceeded {
                what: "edges",
                count: self.pairs.len() + 1,
                limit: self.limits.max_edges,
            });
        }
        self.pairs.insert(pair);

        self.adjacency[ia].push(Link { target: ib, weights });
        self.adjacency[ib].push(Link { target: ia, weights });
        Ok(self)
    }

    pub fn build(self) -> CampusGraph {
        CampusGraph {
            edge_count: self.pairs.len(),
            ids: self.ids,
            index: self.index,
            adjacency: self.adjacency,
        }
    }
}

impl CampusGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Build a graph from flat vertex and walkway lists.
    pub fn from_connections(
        vertices: impl IntoIterator<Item = VertexId>,
        connections: &[Connection],
        limits: GraphLimits,
    ) -> Result<Self, RouteError> {
        let mut builder = GraphBuilder::with_limits(limits);
        for id in vertices {
            builder.add_vertex(id)?;
        }
        for c in connections {
            builder.add_edge(c.start, c.end, c.weights())?;
        }
        Ok(builder.build())
    }

    /// Import the adjacency-list wire form, checking symmetry and weights.
    pub fn from_adjacency(raw: &AdjacencyGraph, limits: GraphLimits) -> Result<Self, RouteError> {
        let mut builder = GraphBuilder::with_limits(limits);
        for &id in &raw.vertices {
            builder.add_vertex(id)?;
        }

        let mut arcs: HashMap<(VertexId, VertexId), EdgeWeights> = HashMap::new();
        for (&from, entries) in &raw.adjacency_list {
            for entry in entries {
                let to = entry.vertex;
                let weights = EdgeWeights::new(entry.distance, entry.time);
                if !builder.contains(from) || !builder.contains(to) {
                    return Err(GraphDefect::DanglingEdge { from, to }.into());
                }
                if from == to {
                    return Err(GraphDefect::SelfLoop(from).into());
                }
                if !weights.is_valid() {
                    return Err(GraphDefect::InvalidWeight {
                        from,
                        to,
                        distance: weights.distance,
                        time: weights.time,
                    }
                    .into());
                }
                if arcs.insert((from, to), weights).is_some() {
                    return Err(GraphDefect::DuplicateEdge { from, to }.into());
                }
            }
        }

        // Walk the lists again so neighbor order follows the input.
        for (&from, entries) in &raw.adjacency_list {
            for entry in entries {
                let to = entry.vertex;
                let weights = arcs[&(from, to)];
                match arcs.get(&(to, from)) {
                    None => return Err(GraphDefect::MissingReverse { from, to }.into()),
                    Some(reverse) if *reverse != weights => {
                        return Err(GraphDefect::AsymmetricWeights { from, to }.into())
                    }
                    Some(_) => {}
                }
                if from < to {
                    builder.add_edge(from, to, weights)?;
                }
            }
        }

        Ok(builder.build())
    }

    /// Export to the adjacency-list wire form.
    pub fn to_adjacency(&self) -> AdjacencyGraph {
        let adjacency_list = self
            .ids
            .iter()
            .zip(&self.adjacency)
            .map(|(&id, links)| {
                let entries = links
                    .iter()
                    .map(|link| AdjacencyEntry {
                        vertex: self.ids[link.target],
                        distance: link.weights.distance,
                        time: link.weights.time,
                    })
                    .collect();
                (id, entries)
            })
            .collect();

        AdjacencyGraph {
            vertices: self.ids.clone(),
            adjacency_list,
        }
    }

    /// Re-check the symmetry and weight invariants.
    pub fn validate(&self) -> Result<(), RouteError> {
        for (u, links) in self.adjacency.iter().enumerate() {
            let from = self.ids[u];
            for link in links {
                let to = self.ids[link.target];
                if link.target == u {
                    return Err(GraphDefect::SelfLoop(from).into());
                }
                if !link.weights.is_valid() {
                    return Err(GraphDefect::InvalidWeight {
                        from,
                        to,
                        distance: link.weights.distance,
                        time: link.weights.time,
                    }
                    .into());
                }
                let reverse = self.adjacency[link.target]
                    .iter()
                    .find(|back| back.target == u)
                    .ok_or(GraphDefect::MissingReverse { from, to })?;
                if reverse.weights != link.weights {
                    return Err(GraphDefect::AsymmetricWeights { from, to }.into());
                }
            }
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.ids.iter().copied()
    }

    /// Neighbors of `id` with the connecting walkway's weights, or `None` for
    /// an unknown vertex.
    pub fn neighbors(
        &self,
        id: VertexId,
    ) -> Option<impl Iterator<Item = (VertexId, EdgeWeights)> + '_> {
        let idx = self.index_of(id)?;
        Some(
            self.adjacency[idx]
                .iter()
                .map(move |link| (self.ids[link.target], link.weights)),
        )
    }

    /// Weights of the walkway between `a` and `b`, if there is one.
    pub fn edge(&self, a: VertexId, b: VertexId) -> Option<EdgeWeights> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        self.adjacency[ia]
            .iter()
            .find(|link| link.target == ib)
            .map(|link| link.weights)
    }

    /// Every undirected edge once.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId, EdgeWeights)> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(u, links)| {
            links
                .iter()
                .filter(move |link| u < link.target)
                .map(move |link| (self.ids[u], self.ids[link.target], link.weights))
        })
    }

    pub(crate) fn index_of(&self, id: VertexId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub(crate) fn id_at(&self, idx: usize) -> VertexId {
        self.ids[idx]
    }

    pub(crate) fn links(&self, idx: usize) -> &[Link] {
        &self.adjacency[idx]
    }
}
