//! Campus location store
//!
//! Owns the location/walkway dataset and answers the lookups the route engine
//! does not care about: filtering, keyword search, name resolution and
//! turning a route's id path into named stops.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use campus_common::{Error, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RouteError;
use crate::graph::{CampusGraph, Connection, GraphLimits, VertexId};
use crate::route::RouteResult;

const BUILTIN_DATASET: &str = include_str!("../data/campus.json");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Campus {
    /// North campus on Changjiang Road
    WestNorth,
    /// East campus
    EastSouth,
}

impl Campus {
    pub fn label(self) -> &'static str {
        match self {
            Campus::WestNorth => "North campus",
            Campus::EastSouth => "East campus",
        }
    }
}

impl fmt::Display for Campus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Teaching,
    Dormitory,
    Dining,
    Study,
    Sports,
    Entrance,
    Admin,
    Medical,
    Service,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Teaching => "Teaching",
            Category::Dormitory => "Dormitory",
            Category::Dining => "Dining",
            Category::Study => "Study",
            Category::Sports => "Sports",
            Category::Entrance => "Entrance",
            Category::Admin => "Administration",
            Category::Medical => "Medical",
            Category::Service => "Services",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relative map position, 0-100 on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPosition {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[schema(value_type = u32, example = 11)]
    pub id: VertexId,
    #[schema(example = "Library")]
    pub name: String,
    pub description: String,
    pub category: Category,
    pub campus: Campus,
    pub position: Position,
    pub geoposition: GeoPosition,
}

/// Serialized dataset: locations plus the walkways between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusDataset {
    pub locations: Vec<Location>,
    pub paths: Vec<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StopRole {
    Start,
    Via,
    End,
}

/// One named stop of a route.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RouteStep {
    #[schema(value_type = u32)]
    pub id: VertexId,
    pub name: String,
    pub role: StopRole,
}

#[derive(Debug, Clone)]
pub struct LocationStore {
    dataset: CampusDataset,
    by_id: HashMap<VertexId, usize>,
}

impl LocationStore {
    /// Store over the bundled two-campus dataset.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATASET)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: CampusDataset =
            serde_json::from_str(json).map_err(|e| Error::InvalidDataset(e.to_string()))?;
        Self::new(dataset)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn new(dataset: CampusDataset) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(dataset.locations.len());
        for (idx, location) in dataset.locations.iter().enumerate() {
            if by_id.insert(location.id, idx).is_some() {
                return Err(Error::InvalidDataset(format!(
                    "location id {} is used more than once",
                    location.id
                )));
            }
        }
        Ok(Self { dataset, by_id })
    }

    pub fn dataset(&self) -> &CampusDataset {
        &self.dataset
    }

    /// Locations matching both filters; `None` matches everything.
    pub fn locations(&self, campus: Option<Campus>, category: Option<Category>) -> Vec<&Location> {
        self.dataset
            .locations
            .iter()
            .filter(|l| campus.map_or(true, |c| l.campus == c))
            .filter(|l| category.map_or(true, |c| l.category == c))
            .collect()
    }

    pub fn get(&self, id: VertexId) -> Option<&Location> {
        self.by_id.get(&id).map(|&idx| &self.dataset.locations[idx])
    }

    /// Case-insensitive substring search over names and descriptions.
    pub fn search(&self, keyword: &str) -> Vec<&Location> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Vec::new();
        }
        self.dataset
            .locations
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&keyword)
                    || l.description.to_lowercase().contains(&keyword)
            })
            .collect()
    }

    /// Resolve user input to a location id.
    ///
    /// Numbers pass through unchecked so the route engine can report unknown
    /// ids itself. Otherwise an exact name wins, then a unique search hit.
    pub fn resolve(&self, query: &str) -> Result<VertexId> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("empty location".to_string()));
        }
        if let Ok(id) = query.parse::<VertexId>() {
            return Ok(id);
        }
        if let Some(location) = self
            .dataset
            .locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(query))
        {
            return Ok(location.id);
        }

        match self.search(query).as_slice() {
            [only] => Ok(only.id),
            [] => Err(Error::location_not_found(query, &self.names())),
            many => {
                let names: Vec<&str> = many.iter().map(|l| l.name.as_str()).collect();
                Err(Error::InvalidInput(format!(
                    "'{query}' is ambiguous, it matches: {}",
                    names.join(", ")
                )))
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.dataset
            .locations
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    pub fn paths(&self) -> &[Connection] {
        &self.dataset.paths
    }

    /// Walkway graph over every location of the dataset.
    pub fn graph(&self, limits: GraphLimits) -> std::result::Result<CampusGraph, RouteError> {
        CampusGraph::from_connections(
            self.dataset.locations.iter().map(|l| l.id),
            &self.dataset.paths,
            limits,
        )
    }

    /// Named stops along a route; empty for an unreachable result.
    pub fn itinerary(&self, route: &RouteResult) -> Vec<RouteStep> {
        let last = route.path.len().saturating_sub(1);
        route
            .path
            .iter()
            .enumerate()
            .map(|(i, &id)| RouteStep {
                id,
                name: self
                    .get(id)
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| format!("#{id}")),
                role: if i == 0 {
                    StopRole::Start
                } else if i == last {
                    StopRole::End
                } else {
                    StopRole::Via
                },
            })
            .collect()
    }
}
