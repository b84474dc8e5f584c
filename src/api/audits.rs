use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use log::{debug, info};

use crate::{
    analysis,
    error::{AppError, AppResult},
    models::Audit,
    schema::{NewAudit, QuickCheckReport, QuickCheckRequest, SiteFilter, filter_matches},
    state::AppState,
};

pub async fn list_audits(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<SiteFilter>,
) -> Json<Vec<Audit>> {
    Json(
        app_state
            .storage
            .audits
            .list_where(|a| filter_matches(&filter.site_id, &a.site_id))
            .await,
    )
}

pub async fn get_audit(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Audit>> {
    app_state
        .storage
        .audits
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("audit {}", id)))
}

pub async fn create_audit(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<NewAudit>,
) -> AppResult<Json<Audit>> {
    let audit = app_state.storage.create_audit(Audit::from(req)).await?;
    info!("New audit {} for site {:?} scored {}", audit.id, audit.site_id, audit.score);
    Ok(Json(audit))
}

/// A missing, empty or non-JSON body is treated as a request without a URL.
pub async fn quick_check(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<QuickCheckRequest>, JsonRejection>,
) -> AppResult<Json<QuickCheckReport>> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Unreadable quick-check body: {}", rejection);
            QuickCheckRequest::default()
        }
    };
    let url = req
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::bad_request("URL required"))?;
    let report = analysis::quick_check(&app_state.fetcher, &url).await?;
    info!(
        "Quick check of {}: score {}, {} issues, {}ms",
        url, report.score, report.total_issues, report.load_time
    );
    Ok(Json(report))
}
