use axum::Json;

use crate::{error::AppResult, schema::IntegrationGuide};

const GUIDES_JSON: &str = include_str!("../../assets/integration_guides.json");

pub fn integration_guides() -> AppResult<Vec<IntegrationGuide>> {
    Ok(serde_json::from_str(GUIDES_JSON)?)
}

pub async fn list_guides() -> AppResult<Json<Vec<IntegrationGuide>>> {
    Ok(Json(integration_guides()?))
}
