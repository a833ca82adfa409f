use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::recipes::dto::{Pagination, RecipePage};
use crate::recipes::repo_types::{Recipe, RecipeFilter};
use crate::storage::NutritionStore;

pub const PAGE_SIZE: i64 = 12;
pub const SEARCH_LIMIT: i64 = 20;
pub const FEATURED_COUNT: i64 = 6;

pub const CATEGORIES: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snacks"];
pub const TAGS: [&str; 6] = [
    "Vegetarian",
    "Vegan",
    "Gluten-Free",
    "Diabetes-Friendly",
    "High-Protein",
    "Low-Carb",
];

/// One page of recipes matching `filter`. Pages start at 1; a page past the
/// end comes back empty.
pub async fn list(
    store: &dyn NutritionStore,
    filter: &RecipeFilter,
    page: i64,
    page_size: i64,
) -> AppResult<RecipePage> {
    if page_size <= 0 {
        return Err(AppError::invalid("page size must be positive"));
    }
    let page = page.max(1);
    let total = store.count_recipes(filter).await?;
    let offset = (page - 1).saturating_mul(page_size);
    let items = if offset >= total {
        Vec::new()
    } else {
        store.list_recipes(filter, Some(page_size), offset).await?
    };
    debug!(page, total, returned = items.len(), "recipe page");
    Ok(RecipePage {
        items,
        pagination: Pagination::new(page, page_size, total),
    })
}

pub async fn search(store: &dyn NutritionStore, query: &str) -> AppResult<Vec<Recipe>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    Ok(store.search_recipes(query, SEARCH_LIMIT).await?)
}

/// Optional category AND every listed tag. Unpaginated.
pub async fn filter_multi(
    store: &dyn NutritionStore,
    category: Option<String>,
    tags: Vec<String>,
) -> AppResult<Vec<Recipe>> {
    let filter = RecipeFilter::new(category, tags);
    Ok(store.list_recipes(&filter, None, 0).await?)
}

pub async fn get_by_id(store: &dyn NutritionStore, id: Uuid) -> AppResult<Recipe> {
    store
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

pub async fn featured(store: &dyn NutritionStore, n: i64) -> AppResult<Vec<Recipe>> {
    Ok(store
        .list_recipes(&RecipeFilter::default(), Some(n), 0)
        .await?)
}
