use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use log::info;

use crate::{
    analysis::content::analyze_content,
    api::{delete_record, patch_record},
    error::AppResult,
    models::ContentItem,
    schema::{
        ContentAnalysis, ContentAnalysisRequest, ContentSuggestion, IdRequest, NewContent,
        OkResponse, PatchRequest, SiteFilter, filter_matches,
    },
    state::AppState,
};

// (title, type, reason)
const SUGGESTIONS: [(&str, &str, &str); 6] = [
    (
        "Ultimate Guide to [Your Primary Keyword]",
        "pillar-page",
        "Pillar content establishes topical authority",
    ),
    (
        "How to [Solve Common Problem] in 2026",
        "blog-post",
        "How-to content ranks well and gets AI citations",
    ),
    (
        "[Your Product] vs [Competitor]: Complete Comparison",
        "blog-post",
        "Comparison content captures commercial intent keywords",
    ),
    (
        "FAQ: Everything About [Topic]",
        "faq",
        "FAQ pages with schema markup get featured snippets and AI citations",
    ),
    (
        "[Industry] Statistics and Trends 2026",
        "blog-post",
        "Data-driven content earns backlinks and citations",
    ),
    (
        "Step-by-Step [Process] Tutorial",
        "blog-post",
        "Tutorial content with HowTo schema ranks for long-tail queries",
    ),
];

pub async fn list_content(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<SiteFilter>,
) -> Json<Vec<ContentItem>> {
    Json(
        app_state
            .storage
            .content
            .list_where(|c| filter_matches(&filter.site_id, &c.site_id))
            .await,
    )
}

pub async fn create_content(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<NewContent>,
) -> AppResult<Json<ContentItem>> {
    let item = app_state.storage.content.insert(ContentItem::from(req)).await?;
    info!("New {} content {}: {}", item.kind, item.id, item.title);
    Ok(Json(item))
}

pub async fn update_content(
    State(app_state): State<Arc<AppState>>,
    Json(patch): Json<PatchRequest>,
) -> AppResult<Json<ContentItem>> {
    Ok(Json(patch_record(&app_state.storage.content, "content", patch).await?))
}

pub async fn delete_content(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> AppResult<Json<OkResponse>> {
    Ok(Json(delete_record(&app_state.storage.content, "content", req).await?))
}

pub async fn content_suggestions() -> Json<Vec<ContentSuggestion>> {
    Json(
        SUGGESTIONS
            .iter()
            .map(|(title, kind, reason)| ContentSuggestion {
                title: title.to_string(),
                kind: kind.to_string(),
                reason: reason.to_string(),
            })
            .collect(),
    )
}

pub async fn analyze(Json(req): Json<ContentAnalysisRequest>) -> Json<ContentAnalysis> {
    Json(analyze_content(&req))
}
