#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

use crate::{
    AdapterRejection, AvailableSlotsResponse, BookSlotRequest, BookSlotResponse, HealthResponse,
    HistoryResponse, ParkingAdapterRuntime, ParkingStatusResponse, ReleaseSlotRequest,
    ReleaseSlotResponse, INVALID_LIMIT_MESSAGE, NOT_FOUND_MESSAGE,
};

type SharedRuntime = Arc<ParkingAdapterRuntime>;

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

impl IntoResponse for AdapterRejection {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

/// Full `/api` surface with CORS headers on every response.
pub fn router(runtime: ParkingAdapterRuntime, cors_origins: &str) -> Router {
    let origin = HeaderValue::from_str(cors_origins).unwrap_or(HeaderValue::from_static("*"));
    Router::new()
        .route("/api/health", get(health).options(preflight))
        .route("/api/parking/status", get(parking_status).options(preflight))
        .route("/api/parking/book", post(book_slot).options(preflight))
        .route("/api/parking/release", post(release_slot).options(preflight))
        .route("/api/parking/history", get(booking_history).options(preflight))
        .route("/api/parking/available", get(available_slots).options(preflight))
        .fallback(not_found)
        .with_state(Arc::new(runtime))
        .layer(middleware::map_response_with_state(origin, add_cors_headers))
}

async fn add_cors_headers(State(origin): State<HeaderValue>, mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> AdapterRejection {
    AdapterRejection::new(404, NOT_FOUND_MESSAGE)
}

async fn health(State(runtime): State<SharedRuntime>) -> Json<HealthResponse> {
    Json(runtime.health())
}

async fn parking_status(State(runtime): State<SharedRuntime>) -> Json<ParkingStatusResponse> {
    Json(runtime.parking_status())
}

// A body that is absent or not the expected JSON object reads as "no fields".
async fn book_slot(
    State(runtime): State<SharedRuntime>,
    payload: Result<Json<BookSlotRequest>, JsonRejection>,
) -> Result<Json<BookSlotResponse>, AdapterRejection> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(%rejection, "book body unreadable");
            BookSlotRequest::default()
        }
    };
    runtime.book_slot(request).map(Json)
}

async fn release_slot(
    State(runtime): State<SharedRuntime>,
    payload: Result<Json<ReleaseSlotRequest>, JsonRejection>,
) -> Result<Json<ReleaseSlotResponse>, AdapterRejection> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(%rejection, "release body unreadable");
            ReleaseSlotRequest::default()
        }
    };
    runtime.release_slot(request).map(Json)
}

async fn booking_history(
    State(runtime): State<SharedRuntime>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AdapterRejection> {
    let Ok(Query(query)) = query else {
        return Err(AdapterRejection::new(400, INVALID_LIMIT_MESSAGE));
    };
    Ok(Json(runtime.booking_history(query.limit)))
}

async fn available_slots(State(runtime): State<SharedRuntime>) -> Json<AvailableSlotsResponse> {
    Json(runtime.available_slots())
}
