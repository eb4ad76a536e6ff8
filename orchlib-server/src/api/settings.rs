//! AppSettings endpoints

use axum::{extract::State, Json};
use orchlib_common::db::models::AppSettings;
use orchlib_common::db::settings::{load_app_settings, save_app_settings};

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<AppSettings>> {
    Ok(Json(load_app_settings(&state.db).await?))
}

/// PUT /api/settings
///
/// Overwrites both settings; an interval below one day is rejected.
pub async fn save_settings(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> ApiResult<Json<AppSettings>> {
    save_app_settings(&state.db, &settings).await?;
    Ok(Json(settings))
}
