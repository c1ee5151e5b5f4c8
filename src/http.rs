use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::engine::{BookingError, BookingService, ErrorKind};
use crate::model::Booking;
use crate::time::format_timestamp;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BookingService>,
}

pub fn router(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{booking_id}", delete(delete_booking))
        .route("/rooms/{room_id}/bookings", get(list_bookings_for_room))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

// ── Wire types ───────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub room_id: String,
    pub start: String,
    pub end: String,
}

impl From<&Booking> for BookingResponse {
    fn from(b: &Booking) -> Self {
        Self {
            booking_id: b.id.to_string(),
            room_id: b.room_id.clone(),
            start: format_timestamp(&b.start_utc),
            end: format_timestamp(&b.end_utc),
        }
    }
}

// ── Errors ───────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Conflict(String),
    NotFound(String),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err.kind() {
            ErrorKind::Malformed | ErrorKind::Validation => {
                ApiError::Validation(format!("Validation error: {err}."))
            }
            ErrorKind::Conflict => ApiError::Conflict(format!("Overlap conflict: {err}.")),
            ErrorKind::NotFound => ApiError::NotFound("Booking not found.".to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Validation error: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────

async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let Json(req) = payload?;
    let booking = state
        .service
        .create_booking(&req.room_id, &req.start, &req.end)
        .await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(&booking))))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_booking(&booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_bookings_for_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Json<Vec<BookingResponse>> {
    let bookings = state.service.list_bookings_for_room(&room_id).await;
    Json(bookings.iter().map(BookingResponse::from).collect())
}
