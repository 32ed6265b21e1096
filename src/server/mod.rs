//! HTTP server for the cabinstay reservation site.

pub mod auth;
mod error;
pub mod routes;
pub mod sessions;

pub use error::ApiError;
pub use sessions::SessionStore;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use cabinstay_core::{BookingRepository, GuestRepository};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{CabinRepository, SettingsRepository, SqliteBookingRepository, SqliteGuestRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub guests: Arc<dyn GuestRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub cabins: CabinRepository,
    pub settings: SettingsRepository,
    pub sessions: Arc<SessionStore>,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wires all repositories to one SQLite pool.
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            guests: Arc::new(SqliteGuestRepository::new(pool.clone())),
            bookings: Arc::new(SqliteBookingRepository::new(pool.clone())),
            cabins: CabinRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
            sessions: Arc::new(SessionStore::new(config.session_ttl_minutes)),
            cookie_secure: config.cookie_secure,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/auth/callback", post(auth::callback))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/signout", post(auth::signout))
        .route("/cabins", get(routes::list_cabins))
        .route("/cabins/{id}", get(routes::get_cabin))
        .route("/cabins/{id}/booked-dates", get(routes::booked_dates))
        .route("/settings", get(routes::settings))
        .route("/account", get(routes::account))
        .route("/account/bookings", get(routes::account_bookings))
        .layer(middleware::from_fn_with_state(state.clone(), auth::authorize))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
