//! Cost metric selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RouteError;
use crate::graph::EdgeWeights;

/// Which edge weight a route query minimizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CostMetric {
    /// Walking distance in meters
    #[default]
    Distance,
    /// Walking time in minutes
    Time,
}

impl CostMetric {
    pub const ALL: [CostMetric; 2] = [CostMetric::Distance, CostMetric::Time];

    /// Weight accessor for this metric. Picked once per query so the search
    /// loop never branches on the metric.
    pub fn weight_fn(self) -> fn(&EdgeWeights) -> f64 {
        match self {
            CostMetric::Distance => |w: &EdgeWeights| w.distance,
            CostMetric::Time => |w: &EdgeWeights| w.time,
        }
    }

    /// The other metric; breaks ties between routes of equal primary cost.
    pub fn tie_break(self) -> CostMetric {
        match self {
            CostMetric::Distance => CostMetric::Time,
            CostMetric::Time => CostMetric::Distance,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CostMetric::Distance => "distance",
            CostMetric::Time => "time",
        }
    }

    /// Unit of the metric's totals, for display.
    pub fn unit(self) -> &'static str {
        match self {
            CostMetric::Distance => "m",
            CostMetric::Time => "min",
        }
    }
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostMetric {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(CostMetric::Distance),
            "time" => Ok(CostMetric::Time),
            _ => Err(RouteError::UnknownMetric(s.to_string())),
        }
    }
}
