use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use log::info;

use crate::{
    api::{delete_record, patch_record},
    error::AppResult,
    models::Link,
    reports,
    schema::{
        IdRequest, LinkFilter, NewLink, OkResponse, OutreachRequest, PatchRequest,
        filter_matches,
    },
    state::AppState,
};

pub async fn list_links(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<LinkFilter>,
) -> Json<Vec<Link>> {
    Json(
        app_state
            .storage
            .links
            .list_where(|l| {
                filter_matches(&filter.site_id, &l.site_id) && filter_matches(&filter.kind, &l.kind)
            })
            .await,
    )
}

pub async fn create_link(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<NewLink>,
) -> AppResult<Json<Link>> {
    let link = app_state.storage.links.insert(Link::from(req)).await?;
    info!("New {} {} from {}", link.kind, link.id, link.source_domain);
    Ok(Json(link))
}

pub async fn update_link(
    State(app_state): State<Arc<AppState>>,
    Json(patch): Json<PatchRequest>,
) -> AppResult<Json<Link>> {
    Ok(Json(patch_record(&app_state.storage.links, "link", patch).await?))
}

pub async fn delete_link(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> AppResult<Json<OkResponse>> {
    Ok(Json(delete_record(&app_state.storage.links, "link", req).await?))
}

pub async fn link_opportunities(State(app_state): State<Arc<AppState>>) -> Json<Vec<Link>> {
    Json(reports::link_opportunities(app_state.storage.links.list().await))
}

pub async fn start_outreach(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<OutreachRequest>,
) -> AppResult<Json<Link>> {
    let link = app_state.storage.links.insert(Link::from(req)).await?;
    info!(
        "Outreach {} started for {} (contact {:?})",
        link.id, link.source_domain, link.contact_email
    );
    Ok(Json(link))
}
