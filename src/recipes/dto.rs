use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipes::repo_types::Recipe;

/// JSON shape of a recipe, including the derived total time.
#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub total_time: i32,
    pub servings: i32,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&Recipe> for RecipeView {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
            image_url: r.image_url.clone(),
            category: r.category.clone(),
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            total_time: r.total_time(),
            servings: r.servings,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
            fiber: r.fiber,
            ingredients: r.ingredients().to_vec(),
            instructions: r.instructions().to_vec(),
            tags: r.tags().to_vec(),
        }
    }
}

pub fn views(recipes: &[Recipe]) -> Vec<RecipeView> {
    recipes.iter().map(RecipeView::from).collect()
}

#[derive(Debug, Serialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeView>,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub recipe: RecipeView,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page,
            per_page,
            total,
            pages,
            has_prev: page > 1,
            has_next: page < pages,
        }
    }
}

#[derive(Debug)]
pub struct RecipePage {
    pub items: Vec<Recipe>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}
fn default_page() -> i64 { 1 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math() {
        let p = Pagination::new(1, 12, 25);
        assert_eq!(p.pages, 3);
        assert!(!p.has_prev);
        assert!(p.has_next);

        let last = Pagination::new(3, 12, 25);
        assert!(last.has_prev);
        assert!(!last.has_next);

        assert_eq!(Pagination::new(1, 12, 0).pages, 0);
        assert_eq!(Pagination::new(1, 12, 12).pages, 1);
    }
}
