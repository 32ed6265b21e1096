//! Read-only API handlers for cabins, settings and the signed-in guest.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cabinstay_core::{
    booked_dates_for_cabin, BlockedDateSet, Booking, Cabin, CabinId, Session, Settings,
};
use chrono::Utc;
use serde::Serialize;

use super::{ApiError, AppState};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn list_cabins(State(state): State<AppState>) -> Result<Json<Vec<Cabin>>, ApiError> {
    Ok(Json(state.cabins.list().await?))
}

pub async fn get_cabin(
    State(state): State<AppState>,
    Path(id): Path<CabinId>,
) -> Result<Json<Cabin>, ApiError> {
    Ok(Json(state.cabins.get(id).await?))
}

/// Dates the cabin cannot be booked on, for the reservation calendar.
pub async fn booked_dates(
    State(state): State<AppState>,
    Path(id): Path<CabinId>,
) -> Result<Json<BlockedDateSet>, ApiError> {
    let blocked = booked_dates_for_cabin(state.bookings.as_ref(), id, Utc::now()).await?;
    Ok(Json(blocked))
}

pub async fn settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.settings.get().await?))
}

/// The signed-in user's session.
pub async fn account(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

/// Bookings of the signed-in guest.
///
/// Empty while the session's guest has not been resolved.
pub async fn account_bookings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = state.bookings.list_by_guest(session.guest_id()).await?;
    Ok(Json(bookings))
}
