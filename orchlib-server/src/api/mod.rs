//! HTTP API handlers for orchlib-server

use serde::Serialize;

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod instruments;
pub mod loans;
pub mod musicians;
pub mod notifications;
pub mod reminders;
pub mod scores;
pub mod settings;

pub use auth::auth_middleware;
pub use dashboard::get_dashboard;
pub use health::health_routes;
pub use instruments::list_instruments;
pub use loans::{create_loan, list_loans, return_loan};
pub use musicians::{
    create_musician, delete_musician, delete_musicians, list_musicians, update_musician,
};
pub use notifications::send_notification;
pub use reminders::run_reminders_now;
pub use scores::{create_scores, delete_score, delete_scores, list_scores, update_score};
pub use settings::{get_settings, save_settings};

/// `?q=` on list endpoints
#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Body of the batch delete endpoints
#[derive(Debug, serde::Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}

/// List payload; a store failure yields no items and `load_failed`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub load_failed: bool,
}

impl<T> ListResponse<T> {
    pub fn loaded(items: Vec<T>) -> Self {
        Self {
            items,
            load_failed: false,
        }
    }

    pub fn failed() -> Self {
        Self {
            items: Vec::new(),
            load_failed: true,
        }
    }
}
