pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod reports;
pub mod schema;
pub mod state;
pub mod utils;

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Builds the full application: the JSON API under `/api`, the health check
/// and, when a static directory is configured, the dashboard UI with an
/// `index.html` fallback for client-side routes.
pub fn build_router(shared_state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Sites
        .route(
            "/sites",
            get(api::sites::list_sites)
                .post(api::sites::create_site)
                .put(api::sites::update_site)
                .delete(api::sites::delete_site),
        )
        // Audits
        .route(
            "/audits",
            get(api::audits::list_audits).post(api::audits::create_audit),
        )
        .route("/audits/quick-check", post(api::audits::quick_check))
        .route("/audits/{id}", get(api::audits::get_audit))
        // Issues
        .route(
            "/issues",
            get(api::issues::list_issues)
                .post(api::issues::create_issue)
                .put(api::issues::update_issue)
                .delete(api::issues::delete_issue),
        )
        .route("/issues/summary", get(api::issues::issue_summary))
        // Content
        .route(
            "/content",
            get(api::content::list_content)
                .post(api::content::create_content)
                .put(api::content::update_content)
                .delete(api::content::delete_content),
        )
        .route("/content/suggestions", get(api::content::content_suggestions))
        .route("/content/analyze", post(api::content::analyze))
        // Keywords
        .route(
            "/keywords",
            get(api::keywords::list_keywords)
                .post(api::keywords::create_keyword)
                .put(api::keywords::update_keyword)
                .delete(api::keywords::delete_keyword),
        )
        .route("/keywords/clusters", get(api::keywords::keyword_clusters))
        // Links
        .route(
            "/links",
            get(api::links::list_links)
                .post(api::links::create_link)
                .put(api::links::update_link)
                .delete(api::links::delete_link),
        )
        .route("/links/opportunities", get(api::links::link_opportunities))
        .route("/links/outreach", post(api::links::start_outreach))
        // Integrations, settings and the dashboard overview
        .route("/integrations/guides", get(api::integrations::list_guides))
        .route(
            "/config",
            get(api::settings::get_settings).put(api::settings::update_settings),
        )
        .route("/analytics", get(api::analytics::analytics))
        .layer(from_fn_with_state(
            shared_state.clone(),
            middleware::apikey_auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(api::health_check))
        .nest("/api", api_routes);

    if let Some(dir) = &shared_state.config.static_dir {
        let index = Path::new(dir).join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(DefaultBodyLimit::max(shared_state.config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}
