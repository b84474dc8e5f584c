use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use log::info;

use crate::{
    api::{delete_record, patch_record},
    error::AppResult,
    models::Keyword,
    reports,
    schema::{
        IdRequest, KeywordCluster, NewKeyword, OkResponse, PatchRequest, SiteFilter,
        filter_matches,
    },
    state::AppState,
};

pub async fn list_keywords(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<SiteFilter>,
) -> Json<Vec<Keyword>> {
    Json(
        app_state
            .storage
            .keywords
            .list_where(|k| filter_matches(&filter.site_id, &k.site_id))
            .await,
    )
}

pub async fn create_keyword(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<NewKeyword>,
) -> AppResult<Json<Keyword>> {
    let keyword = app_state.storage.keywords.insert(Keyword::from(req)).await?;
    info!("Tracking keyword {} ({})", keyword.keyword, keyword.id);
    Ok(Json(keyword))
}

pub async fn update_keyword(
    State(app_state): State<Arc<AppState>>,
    Json(patch): Json<PatchRequest>,
) -> AppResult<Json<Keyword>> {
    Ok(Json(patch_record(&app_state.storage.keywords, "keyword", patch).await?))
}

pub async fn delete_keyword(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> AppResult<Json<OkResponse>> {
    Ok(Json(delete_record(&app_state.storage.keywords, "keyword", req).await?))
}

pub async fn keyword_clusters(State(app_state): State<Arc<AppState>>) -> Json<Vec<KeywordCluster>> {
    Json(reports::keyword_clusters(app_state.storage.keywords.list().await))
}
