use axum::{extract::State, response::Response, routing::get, Router};
use serde_json::json;
use tracing::instrument;

use crate::{
    error::AppResult,
    recipes::{dto::views, services::{featured, FEATURED_COUNT}},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
}

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let recipes = featured(state.store.as_ref(), FEATURED_COUNT).await?;
    Ok(state
        .renderer
        .render("index.html", json!({ "featured_recipes": views(&recipes) })))
}

#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> Response {
    state.renderer.render("about.html", json!({}))
}
