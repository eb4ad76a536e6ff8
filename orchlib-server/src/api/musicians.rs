//! Musician endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use orchlib_common::db::models::{Musician, MusicianInput};
use orchlib_common::db::musicians;
use orchlib_common::listing::sort_musicians;
use orchlib_common::search::SearchQuery;
use orchlib_common::time;
use tracing::warn;

use super::{DeleteRequest, ListResponse, SearchParams};
use crate::error::ApiResult;
use crate::services::{self, DeleteOutcome};
use crate::AppState;

/// GET /api/musicians?q=
///
/// Sorted by last name, then filtered by the multi-word query.
pub async fn list_musicians(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<ListResponse<Musician>> {
    let query = SearchQuery::parse(params.q.as_deref().unwrap_or_default());

    match musicians::list_musicians(&state.db).await {
        Ok(mut all) => {
            sort_musicians(&mut all);
            Json(ListResponse::loaded(query.filter(all)))
        }
        Err(e) => {
            warn!("Failed to load musicians: {}", e);
            Json(ListResponse::failed())
        }
    }
}

/// POST /api/musicians
pub async fn create_musician(
    State(state): State<AppState>,
    Json(input): Json<MusicianInput>,
) -> ApiResult<(StatusCode, Json<Musician>)> {
    let musician = musicians::insert_musician(&state.db, &input, time::now()).await?;
    Ok((StatusCode::CREATED, Json(musician)))
}

/// PUT /api/musicians/:id
pub async fn update_musician(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MusicianInput>,
) -> ApiResult<Json<Musician>> {
    Ok(Json(musicians::update_musician(&state.db, &id, &input).await?))
}

/// POST /api/musicians/delete
pub async fn delete_musicians(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(services::delete_musicians(&state.db, &request.ids).await?))
}

/// DELETE /api/musicians/:id
pub async fn delete_musician(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(services::delete_musicians(&state.db, &[id]).await?))
}
