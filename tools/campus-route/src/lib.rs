pub mod campus;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod metric;
pub mod route;
pub mod server;
pub mod verify;

pub use campus::LocationStore;
pub use error::{GraphDefect, RouteError};
pub use graph::{CampusGraph, Connection, EdgeWeights, GraphLimits, VertexId};
pub use metric::CostMetric;
pub use route::{find_shortest_path, RouteResult};
