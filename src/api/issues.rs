use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use log::info;

use crate::{
    api::delete_record,
    error::{AppError, AppResult},
    models::Issue,
    reports,
    schema::{IdRequest, IssueFilter, IssueSummary, NewIssue, OkResponse, PatchRequest},
    state::AppState,
};

pub async fn list_issues(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<IssueFilter>,
) -> Json<Vec<Issue>> {
    Json(app_state.storage.issues.list_where(|i| filter.matches(i)).await)
}

pub async fn issue_summary(State(app_state): State<Arc<AppState>>) -> Json<IssueSummary> {
    Json(reports::issue_summary(&app_state.storage.issues.list().await))
}

pub async fn create_issue(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<NewIssue>,
) -> AppResult<Json<Issue>> {
    let issue = app_state.storage.issues.insert(Issue::from(req)).await?;
    info!("New {} issue {}: {}", issue.severity, issue.id, issue.title);
    Ok(Json(issue))
}

pub async fn update_issue(
    State(app_state): State<Arc<AppState>>,
    Json(patch): Json<PatchRequest>,
) -> AppResult<Json<Issue>> {
    app_state
        .storage
        .update_issue(&patch.id, patch.fields)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("issue {}", patch.id)))
}

pub async fn delete_issue(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> AppResult<Json<OkResponse>> {
    Ok(Json(delete_record(&app_state.storage.issues, "issue", req).await?))
}
