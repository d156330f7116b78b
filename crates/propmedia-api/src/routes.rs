//! Router assembly.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api_doc;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state);
    let body_limit = state.config.max_upload_body_bytes();

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "ok"})) }))
        .route(
            "/api/openapi.json",
            get(|| async { Json(api_doc::get_openapi_spec()) }),
        )
        .route(
            &format!("{}/{{owner_kind}}/{{id}}/media", API_PREFIX),
            post(handlers::upload::upload_media)
                .get(handlers::media_get::list_media)
                .delete(handlers::media_delete::delete_owner_media),
        )
        .route(
            &format!("{}/{{owner_kind}}/{{id}}/media/primary", API_PREFIX),
            get(handlers::media_get::get_primary_media),
        )
        .route(
            &format!("{}/{{owner_kind}}/{{id}}/media/order", API_PREFIX),
            put(handlers::media_update::reorder_media),
        )
        .route(
            &format!("{}/media/{{id}}", API_PREFIX),
            get(handlers::media_get::get_media)
                .patch(handlers::media_update::update_media)
                .delete(handlers::media_delete::delete_media),
        )
        .route(
            &format!("{}/media/{{id}}/file", API_PREFIX),
            get(handlers::media_download::download_media_file),
        )
        .route(
            &format!("{}/media/{{id}}/thumbnail", API_PREFIX),
            get(handlers::media_download::download_media_thumbnail),
        )
        .route(
            &format!("{}/media/{{id}}/primary", API_PREFIX),
            put(handlers::media_update::set_primary_media),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}
