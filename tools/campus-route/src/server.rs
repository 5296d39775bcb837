//! HTTP API handlers with Axum and Utoipa

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::campus::{
    Campus, Category, GeoPosition, Location, LocationStore, Position, RouteStep, StopRole,
};
use crate::error::RouteError;
use crate::graph::{CampusGraph, VertexId};
use crate::metric::CostMetric;
use crate::route::find_shortest_path;

/// Shared, read-only server state
#[derive(Debug)]
pub struct AppState {
    pub store: LocationStore,
    pub graph: CampusGraph,
}

impl AppState {
    pub fn new(store: LocationStore, graph: CampusGraph) -> Self {
        Self { store, graph }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(route, locations, location, search, health),
    components(schemas(
        RouteResponse,
        RouteStep,
        StopRole,
        Location,
        Position,
        GeoPosition,
        Campus,
        Category,
        CostMetric,
        ErrorResponse
    )),
    info(
        title = "Campus Route API",
        description = "Shortest walking routes between campus locations"
    )
)]
struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/route", get(route))
        .route("/locations", get(locations))
        .route("/locations/{id}", get(location))
        .route("/search", get(search))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "campus route server listening");
    tracing::info!("Swagger UI: http://{addr}/swagger-ui/");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Errors ============

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error carrying the HTTP status it maps to.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(err: RouteError) -> Self {
        let status = match &err {
            RouteError::UnknownVertex(_) | RouteError::UnknownMetric(_) => StatusCode::BAD_REQUEST,
            RouteError::MalformedGraph(_) | RouteError::LimitExceeded { .. } => {
                tracing::error!(error = %err, "route engine failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<campus_common::Error> for ApiError {
    fn from(err: campus_common::Error) -> Self {
        use campus_common::Error;
        let status = match &err {
            Error::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::InvalidDataset(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============ Route Endpoint ============

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteQuery {
    /// Start location: id or name
    #[param(example = "North Gate")]
    start: String,
    /// End location: id or name
    #[param(example = "11")]
    end: String,
    /// Cost to minimize: distance (default) or time
    #[param(example = "distance")]
    metric: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Location ids from start to end; empty when unreachable
    #[schema(value_type = Vec<u32>, example = json!([0, 1, 11]))]
    pub path: Vec<VertexId>,
    /// Meters
    #[schema(example = 450.0)]
    pub total_distance: f64,
    /// Minutes
    #[schema(example = 6.0)]
    pub total_time: f64,
    pub found: bool,
    pub steps: Vec<RouteStep>,
}

/// Find the shortest walking route between two locations
#[utoipa::path(
    get,
    path = "/route",
    params(RouteQuery),
    responses(
        (status = 200, description = "Route computed; `found` is false when unreachable", body = RouteResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Unknown location name", body = ErrorResponse),
    )
)]
async fn route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let metric = match query.metric.as_deref() {
        Some(m) => m.parse::<CostMetric>()?,
        None => CostMetric::default(),
    };

    let start = state.store.resolve(&query.start)?;
    let end = state.store.resolve(&query.end)?;
    if start == end {
        return Err(ApiError::bad_request(
            "start and end must be different locations",
        ));
    }

    let result = find_shortest_path(&state.graph, start, end, metric)?;
    let steps = state.store.itinerary(&result);

    Ok(Json(RouteResponse {
        found: result.is_found(),
        path: result.path,
        total_distance: result.total_distance,
        total_time: result.total_time,
        steps,
    }))
}

// ============ Location Endpoints ============

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationFilter {
    campus: Option<Campus>,
    category: Option<Category>,
}

/// List locations, optionally filtered by campus and category
#[utoipa::path(
    get,
    path = "/locations",
    params(LocationFilter),
    responses(
        (status = 200, description = "Matching locations", body = Vec<Location>),
        (status = 400, description = "Unknown campus or category"),
    )
)]
async fn locations(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LocationFilter>,
) -> Json<Vec<Location>> {
    Json(
        state
            .store
            .locations(filter.campus, filter.category)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// Fetch one location by id
#[utoipa::path(
    get,
    path = "/locations/{id}",
    params(("id" = u32, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location", body = Location),
        (status = 404, description = "No such location", body = ErrorResponse),
    )
)]
async fn location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<VertexId>,
) -> Result<Json<Location>, ApiError> {
    state
        .store
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no location with id {id}")))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Keyword matched against names and descriptions
    #[param(example = "library")]
    q: String,
}

/// Keyword search over location names and descriptions
#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses((status = 200, description = "Matching locations", body = Vec<Location>))
)]
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Location>> {
    Json(state.store.search(&query.q).into_iter().cloned().collect())
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server is healthy"))
)]
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "locations": state.graph.vertex_count(),
        "paths": state.graph.edge_count(),
    }))
}
