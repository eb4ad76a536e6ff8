//! Score endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use orchlib_common::db::models::{NewScores, Score, ScoreInput};
use orchlib_common::db::scores;
use orchlib_common::listing::sort_scores;
use orchlib_common::search::SearchQuery;
use orchlib_common::time;
use serde::Serialize;
use tracing::warn;

use super::{DeleteRequest, ListResponse, SearchParams};
use crate::error::ApiResult;
use crate::services::{self, DeleteOutcome};
use crate::AppState;

/// Scores created by one bulk request, in part selection order
#[derive(Debug, Serialize)]
pub struct CreatedScores {
    pub ids: Vec<String>,
    pub scores: Vec<Score>,
}

/// GET /api/scores?q=
pub async fn list_scores(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<ListResponse<Score>> {
    let query = SearchQuery::parse(params.q.as_deref().unwrap_or_default());

    match scores::list_scores(&state.db).await {
        Ok(mut all) => {
            sort_scores(&mut all);
            Json(ListResponse::loaded(query.filter(all)))
        }
        Err(e) => {
            warn!("Failed to load scores: {}", e);
            Json(ListResponse::failed())
        }
    }
}

/// POST /api/scores
///
/// One score per selected part.
pub async fn create_scores(
    State(state): State<AppState>,
    Json(new): Json<NewScores>,
) -> ApiResult<(StatusCode, Json<CreatedScores>)> {
    let created = scores::insert_scores(&state.db, &new, time::now()).await?;
    let ids = created.iter().map(|s| s.id.clone()).collect();
    Ok((
        StatusCode::CREATED,
        Json(CreatedScores {
            ids,
            scores: created,
        }),
    ))
}

/// PUT /api/scores/:id
pub async fn update_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ScoreInput>,
) -> ApiResult<Json<Score>> {
    Ok(Json(scores::update_score(&state.db, &id, &input).await?))
}

/// POST /api/scores/delete
pub async fn delete_scores(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(services::delete_scores(&state.db, &request.ids).await?))
}

/// DELETE /api/scores/:id
pub async fn delete_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(services::delete_scores(&state.db, &[id]).await?))
}
