use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::AppResult,
    nutrition::{calories_from_macros, macro_breakdown},
    recipes::{
        dto::{views, BrowseQuery, RecipeResponse, RecipeView, RecipesResponse, SearchQuery},
        repo_types::RecipeFilter,
        services::{self, CATEGORIES, PAGE_SIZE, TAGS},
    },
    state::AppState,
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(browse))
        .route("/recipes/:id", get(detail))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/api/search", get(search))
        .route("/recipes/api/filter", get(filter))
        .route("/recipes/api/:id", get(get_recipe))
}

#[instrument(skip(state))]
pub async fn browse(
    State(state): State<AppState>,
    query: Result<Query<BrowseQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(q) = query?;
    let filter = RecipeFilter::new(q.category.clone(), q.tag.clone().into_iter().collect());
    let page = services::list(state.store.as_ref(), &filter, q.page, PAGE_SIZE).await?;

    Ok(state.renderer.render(
        "recipes/browse.html",
        json!({
            "recipes": views(&page.items),
            "pagination": page.pagination,
            "categories": CATEGORIES,
            "tags": TAGS,
            "current_category": q.category,
            "current_tag": q.tag,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let recipe = services::get_by_id(state.store.as_ref(), id).await?;
    let macros = recipe.macros();

    Ok(state.renderer.render(
        "recipes/detail.html",
        json!({
            "recipe": RecipeView::from(&recipe),
            "macros": macro_breakdown(&macros),
            "calories_from_macros": calories_from_macros(macros.protein, macros.carbs, macros.fats),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<RecipesResponse>> {
    let Query(q) = query?;
    let recipes = services::search(state.store.as_ref(), &q.q).await?;
    Ok(Json(RecipesResponse {
        recipes: views(&recipes),
    }))
}

/// `?category=Lunch&tags=Vegan&tags=Gluten-Free`: tags repeat, so the query is
/// read as raw pairs.
#[instrument(skip(state))]
pub async fn filter(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<RecipesResponse>> {
    let Query(pairs) = query?;
    let mut category = None;
    let mut tags = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "category" => category = Some(value),
            "tags" | "tags[]" => tags.push(value),
            _ => {}
        }
    }
    let recipes = services::filter_multi(state.store.as_ref(), category, tags).await?;
    Ok(Json(RecipesResponse {
        recipes: views(&recipes),
    }))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<RecipeResponse>> {
    let Path(id) = id?;
    let recipe = services::get_by_id(state.store.as_ref(), id).await?;
    Ok(Json(RecipeResponse {
        recipe: RecipeView::from(&recipe),
    }))
}
