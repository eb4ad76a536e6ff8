//! Loan endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use orchlib_common::db::models::Loan;
use orchlib_common::db::{loans, musicians, scores};
use orchlib_common::listing::{join_loans, sort_loans, LoanCounts, LoanFilter, LoanView};
use orchlib_common::search::SearchQuery;
use orchlib_common::time;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiResult;
use crate::services::{self, NewLoan};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoanParams {
    #[serde(default)]
    pub q: Option<String>,
    /// active (default), returned or all
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoanListResponse {
    pub items: Vec<LoanView>,
    pub counts: LoanCounts,
    pub load_failed: bool,
}

/// GET /api/loans?status=&q=
///
/// Most recent first. The status filter applies before the search; the
/// counts cover every loan.
pub async fn list_loans(
    State(state): State<AppState>,
    Query(params): Query<LoanParams>,
) -> ApiResult<Json<LoanListResponse>> {
    let status: LoanFilter = params.status.as_deref().unwrap_or_default().parse()?;
    let query = SearchQuery::parse(params.q.as_deref().unwrap_or_default());

    let loaded = async {
        let all = loans::list_loans(&state.db).await?;
        let musicians = musicians::list_musicians(&state.db).await?;
        let scores = scores::list_scores(&state.db).await?;
        Ok::<_, orchlib_common::Error>((all, musicians, scores))
    }
    .await;

    let (mut all, musicians, scores) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!("Failed to load loans: {}", e);
            return Ok(Json(LoanListResponse {
                items: Vec::new(),
                counts: LoanCounts::default(),
                load_failed: true,
            }));
        }
    };

    let counts = LoanCounts::of(&all);
    sort_loans(&mut all);
    let shown: Vec<_> = all.into_iter().filter(|loan| status.admits(loan)).collect();
    let views = join_loans(shown, &musicians, &scores, &Local, &state.date_format);

    Ok(Json(LoanListResponse {
        items: query.filter(views),
        counts,
        load_failed: false,
    }))
}

/// POST /api/loans
pub async fn create_loan(
    State(state): State<AppState>,
    Json(new): Json<NewLoan>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let loan = services::create_loan(&state.db, state.notifier.as_ref(), &new, time::now()).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// POST /api/loans/:id/return
pub async fn return_loan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Loan>> {
    let loan = services::return_loan(&state.db, state.notifier.as_ref(), &id, time::now()).await?;
    Ok(Json(loan))
}
