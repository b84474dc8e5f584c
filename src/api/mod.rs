pub mod analytics;
pub mod audits;
pub mod content;
pub mod integrations;
pub mod issues;
pub mod keywords;
pub mod links;
pub mod settings;
pub mod sites;

use axum::Json;
use chrono::Utc;
use log::info;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    db::collection::JsonCollection,
    error::{AppError, AppResult},
    models::Record,
    schema::{HealthResponse, IdRequest, OkResponse, PatchRequest},
};

/// Shared body of the `PUT` endpoints: merge the patch into the record or 404.
pub(crate) async fn patch_record<T>(
    collection: &JsonCollection<T>,
    kind: &str,
    patch: PatchRequest,
) -> AppResult<T>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    collection
        .update(&patch.id, patch.fields)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {}", kind, patch.id)))
}

/// Shared body of the `DELETE` endpoints. Deleting an unknown id succeeds.
pub(crate) async fn delete_record<T>(
    collection: &JsonCollection<T>,
    kind: &str,
    req: IdRequest,
) -> AppResult<OkResponse>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    let removed = collection.delete(&req.id).await?;
    if removed > 0 {
        info!("Deleted {} {}", kind, req.id);
    }
    Ok(OkResponse::ok())
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}
