//! HTTP routes for the visualization API.
//!
//! Read and write handlers share one library behind a `RwLock`; writes
//! (patch, delete, rebuild) take the write half. Responses are plain
//! JSON; failures render as `{"error": message}` via [`ApiError`].

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::library::{ArticleDetail, ArticleFilter, ArticlePatch, ArticleSummary, Library};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<RwLock<Library>>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/articles", get(list_articles))
        .route(
            "/api/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/api/visualization/rebuild", post(rebuild))
        .with_state(state)
}

/// Liveness probe for process supervisors.
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn list_articles(
    State(state): State<AppState>, Query(filter): Query<ArticleFilter>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let library = state.library.read().await;
    Ok(Json(library.list(&filter)))
}

async fn get_article(
    State(state): State<AppState>, Path(id): Path<Uuid>,
) -> Result<Json<ArticleDetail>, ApiError> {
    let library = state.library.read().await;
    library.detail(id).map(Json)
}

async fn update_article(
    State(state): State<AppState>, Path(id): Path<Uuid>, Json(patch): Json<ArticlePatch>,
) -> Result<Json<ArticleDetail>, ApiError> {
    if patch.title.is_none() && patch.tags.is_none() && patch.body.is_none() {
        return Err(ApiError::Invalid("patch has no fields to apply".to_string()));
    }

    let mut library = state.library.write().await;
    let detail = library.update(id, &patch)?;
    info!(id = %id, "article updated");
    Ok(Json(detail))
}

async fn delete_article(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let mut library = state.library.write().await;
    library.delete(id)?;
    info!(id = %id, "article deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn rebuild(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut library = state.library.write().await;
    let articles = library.rebuild()?;
    info!(articles, "library rebuilt");
    Ok(Json(json!({ "articles": articles })))
}
