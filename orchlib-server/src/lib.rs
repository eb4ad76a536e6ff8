//! orchlib-server library - sheet-music loan tracker HTTP service
//!
//! Exposes the router and the services so tests can drive them without a
//! listening socket.

use axum::Router;
use orchlib_common::listing::DEFAULT_DATE_FORMAT;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod services;

use notify::Notifier;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notifier: Arc<dyn Notifier>,
    /// Bearer token for protected routes; `None` disables authentication
    pub api_token: Option<String>,
    /// chrono format for loan dates in listings and search
    pub date_format: String,
}

impl AppState {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>, api_token: Option<String>) -> Self {
        Self {
            db,
            notifier,
            api_token,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }
}

/// Build application router
///
/// `/health` is public; everything under `/api` requires the bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    let protected = Router::new()
        .route(
            "/api/musicians",
            get(api::list_musicians).post(api::create_musician),
        )
        .route(
            "/api/musicians/:id",
            put(api::update_musician).delete(api::delete_musician),
        )
        .route("/api/musicians/delete", post(api::delete_musicians))
        .route("/api/scores", get(api::list_scores).post(api::create_scores))
        .route(
            "/api/scores/:id",
            put(api::update_score).delete(api::delete_score),
        )
        .route("/api/scores/delete", post(api::delete_scores))
        .route("/api/instruments", get(api::list_instruments))
        .route("/api/loans", get(api::list_loans).post(api::create_loan))
        .route("/api/loans/:id/return", post(api::return_loan))
        .route(
            "/api/settings",
            get(api::get_settings).put(api::save_settings),
        )
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/notifications", post(api::send_notification))
        .route("/api/reminders/run", post(api::run_reminders_now))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
