use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::meal_plans::repo_types::{MealPlan, MealPlanEntry, NewMealPlan};
use crate::recipes::repo_types::{NewRecipe, Recipe, RecipeFilter};
use crate::users::repo_types::User;

pub mod memory;
pub mod pg;

/// Persistence for users, recipes and meal-plan entries.
///
/// `upsert_meal_plan` must be atomic: one entry per (user, date, slot)
/// no matter how many callers race on the same slot.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Returns the existing user with this name or creates one with default goals.
    async fn upsert_user(&self, username: &str) -> anyhow::Result<User>;

    async fn get_recipe(&self, id: Uuid) -> anyhow::Result<Option<Recipe>>;
    async fn insert_recipe(&self, recipe: &NewRecipe) -> anyhow::Result<Recipe>;
    async fn count_recipes(&self, filter: &RecipeFilter) -> anyhow::Result<i64>;
    /// Ordered by name then id. `limit = None` means no limit.
    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>>;
    /// Case-insensitive substring match on name or description.
    async fn search_recipes(&self, text: &str, limit: i64) -> anyhow::Result<Vec<Recipe>>;

    async fn upsert_meal_plan(&self, plan: &NewMealPlan) -> anyhow::Result<MealPlan>;
    /// `false` when nothing had that id.
    async fn delete_meal_plan(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Entries dated `from..=to`, each with its recipe when it still resolves.
    async fn list_meal_entries(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<MealPlanEntry>>;
}
