use std::sync::Arc;

use axum::{Json, extract::State};
use log::info;

use crate::{
    api::{delete_record, patch_record},
    error::AppResult,
    models::Site,
    schema::{IdRequest, NewSite, OkResponse, PatchRequest},
    state::AppState,
};

pub async fn list_sites(State(app_state): State<Arc<AppState>>) -> Json<Vec<Site>> {
    Json(app_state.storage.sites.list().await)
}

pub async fn create_site(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<NewSite>,
) -> AppResult<Json<Site>> {
    let site = Site::try_from(req)?;
    let site = app_state.storage.sites.insert(site).await?;
    info!("New site {} ({})", site.id, site.domain);
    Ok(Json(site))
}

pub async fn update_site(
    State(app_state): State<Arc<AppState>>,
    Json(patch): Json<PatchRequest>,
) -> AppResult<Json<Site>> {
    Ok(Json(patch_record(&app_state.storage.sites, "site", patch).await?))
}

pub async fn delete_site(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> AppResult<Json<OkResponse>> {
    Ok(Json(delete_record(&app_state.storage.sites, "site", req).await?))
}
