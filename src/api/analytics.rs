use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    reports,
    schema::AnalyticsSnapshot,
    state::AppState,
};

pub async fn analytics(State(app_state): State<Arc<AppState>>) -> Json<AnalyticsSnapshot> {
    let storage = &app_state.storage;
    let (sites, issues, content, keywords, links) = tokio::join!(
        storage.sites.list(),
        storage.issues.list(),
        storage.content.list(),
        storage.keywords.list(),
        storage.links.list(),
    );
    Json(reports::analytics_snapshot(
        &sites, &issues, &content, &keywords, &links,
    ))
}
