use std::sync::Arc;

use axum::{Json, extract::State};
use log::info;
use serde_json::{Map, Value};

use crate::{error::AppResult, state::AppState};

pub async fn get_settings(State(app_state): State<Arc<AppState>>) -> Json<Map<String, Value>> {
    Json(app_state.storage.settings.load().await)
}

pub async fn update_settings(
    State(app_state): State<Arc<AppState>>,
    Json(patch): Json<Map<String, Value>>,
) -> AppResult<Json<Map<String, Value>>> {
    let keys: Vec<&String> = patch.keys().collect();
    info!("Updating settings: {:?}", keys);
    Ok(Json(app_state.storage.settings.merge(patch).await?))
}
