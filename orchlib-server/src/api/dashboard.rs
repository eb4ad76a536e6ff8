//! Dashboard summary

use axum::{extract::State, Json};
use chrono::Local;
use orchlib_common::db::{loans, musicians, scores};
use orchlib_common::listing::DashboardSummary;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub summary: DashboardSummary,
    pub load_failed: bool,
}

/// GET /api/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let loaded = async {
        let all = loans::list_loans(&state.db).await?;
        let musicians = musicians::list_musicians(&state.db).await?;
        let scores = scores::list_scores(&state.db).await?;
        Ok::<_, orchlib_common::Error>((all, musicians, scores))
    }
    .await;

    match loaded {
        Ok((all, musicians, scores)) => Json(DashboardResponse {
            summary: DashboardSummary::build(all, &musicians, &scores, &Local, &state.date_format),
            load_failed: false,
        }),
        Err(e) => {
            warn!("Failed to load dashboard: {}", e);
            Json(DashboardResponse {
                summary: DashboardSummary::empty(),
                load_failed: true,
            })
        }
    }
}
