use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use saferoute_core::prelude::*;

pub type SharedRouter = Arc<SafeRouter>;

pub fn build_router(router: SharedRouter, timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/routes/safest", post(safest_route))
        .route("/api/routes/debug-incident-check", post(debug_incident_check))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(router)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::NoRegion { .. } | Error::NoRoadNearby { .. } | Error::NoPath { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::InvalidData(_) | Error::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        Error::GraphLoad { .. } | Error::IncidentSourceUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        Error::Cancelled => StatusCode::REQUEST_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            status: status_for(&error),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

async fn handle_middleware_error(error: BoxError) -> ApiError {
    if error.is::<tower::timeout::error::Elapsed>() {
        ApiError {
            status: StatusCode::REQUEST_TIMEOUT,
            message: "Request timed out".to_string(),
        }
    } else {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Unhandled internal error: {error}"),
        }
    }
}

/// Cancels the token when the request future is dropped.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Runs `job` on the blocking pool. Dropping the returned future (client
/// gone, timeout) cancels the search at its next poll.
async fn run_blocking<T, F>(router: SharedRouter, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SafeRouter, &CancelToken) -> Result<T, Error> + Send + 'static,
{
    let token = CancelToken::new();
    let _guard = CancelOnDrop(token.clone());

    tokio::task::spawn_blocking(move || job(&router, &token))
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Routing task failed: {e}"),
        })?
        .map_err(ApiError::from)
}

async fn health(State(router): State<SharedRouter>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "loadedGraphs": router.catalog().len(),
        "cachedWeights": router.cache().len(),
    }))
}

async fn safest_route(
    State(router): State<SharedRouter>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<SafeRoute>, ApiError> {
    let route = run_blocking(router, move |router, token| {
        router.find_safest_route_with(&request, token)
    })
    .await?;
    tracing::info!(
        nodes = route.nodes.len(),
        risk = route.risk,
        length_meters = route.length_meters,
        "route planned"
    );
    Ok(Json(route))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentCheckRequest {
    #[serde(flatten)]
    pub route: RouteRequest,
    #[serde(alias = "crimeLat", alias = "incident_lat")]
    pub incident_lat: f64,
    #[serde(alias = "crimeLng", alias = "incident_lng")]
    pub incident_lng: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentCheckResponse {
    /// "yes" when the point sits within the buffer of a route edge
    pub result: &'static str,
    #[serde(flatten)]
    pub inspection: RouteInspection,
}

async fn debug_incident_check(
    State(router): State<SharedRouter>,
    Json(request): Json<IncidentCheckRequest>,
) -> Result<Json<IncidentCheckResponse>, ApiError> {
    let point = Coordinate::new(request.incident_lat, request.incident_lng);
    let inspection = run_blocking(router, move |router, token| {
        router.inspect_incident_with(&request.route, point, token)
    })
    .await?;

    Ok(Json(IncidentCheckResponse {
        result: if inspection.on_route { "yes" } else { "no" },
        inspection,
    }))
}
