// src/api.rs
//! HTTP surface for the mobile client.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::lookup::{ProductResolver, DEFAULT_SEARCH_LIMIT};
use crate::product::product_search_links;

/// Upper bound for `?limit=` on `/search`.
const MAX_SEARCH_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub resolver: ProductResolver,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/product/{code}", get(lookup_product))
        .route("/product/{code}/links", get(search_links))
        .route("/search", get(search_products))
        .route("/status", get(api_status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn lookup_product(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    match state.resolver.lookup_product(&code).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn search_links(Path(code): Path<String>) -> impl IntoResponse {
    Json(product_search_links(&crate::barcode::normalize(&code)))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT);
    Json(state.resolver.search_products(&params.q, limit).await)
}

async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.resolver.api_status())
}
