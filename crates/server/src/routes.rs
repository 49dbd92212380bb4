//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use relay_assign::AssignError;
use relay_core::TicketRequest;
use relay_store::StoreError;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::intake::{IntakeError, IntakeService, TicketReceipt};

/// State shared across handlers.
pub struct AppState {
    /// Intake pipeline
    pub intake: IntakeService,

    /// Bearer token required on /v1 routes, if set
    pub api_key: Option<String>,

    /// Process start, for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    /// Create app state without authentication.
    pub fn new(intake: IntakeService) -> Self {
        Self {
            intake,
            api_key: None,
            start_time: Instant::now(),
        }
    }

    /// Require a bearer token on /v1 routes.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }
}

type AppStateArc = Arc<AppState>;

/// Build the full router.
pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(health_routes())
        .merge(ticket_routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Health Routes
// ============================================================================

fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn ready(State(state): State<AppStateArc>) -> Response {
    match state.intake.health().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response(),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Ticket Routes
// ============================================================================

fn ticket_routes(state: AppStateArc) -> Router<AppStateArc> {
    Router::new()
        .route("/v1/tickets", post(create_ticket))
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}

async fn create_ticket(
    State(state): State<AppStateArc>,
    payload: Result<Json<TicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketReceipt>), IntakeError> {
    let Json(req) = payload?;
    let receipt = state.intake.submit(req).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn require_api_key(
    State(state): State<AppStateArc>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(expected) {
        next.run(request).await
    } else {
        warn!("Rejected request to {} with missing or wrong API key", request.uri().path());
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing or invalid API key" })),
        )
            .into_response()
    }
}

impl IntakeError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntakeError::Malformed(rejection) => rejection.status(),
            IntakeError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IntakeError::Assign(AssignError::EmptyRoster) => StatusCode::INTERNAL_SERVER_ERROR,
            IntakeError::Assign(AssignError::Upstream(StoreError::Config(_)))
            | IntakeError::Store(StoreError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            IntakeError::Assign(AssignError::Upstream(e)) | IntakeError::Store(e)
                if e.is_rate_limited() =>
            {
                StatusCode::SERVICE_UNAVAILABLE
            }
            IntakeError::Assign(AssignError::Upstream(_)) | IntakeError::Store(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Ticket intake failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
