use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meal_plans::repo_types::{MealPlan, MealPlanEntry, NewMealPlan, RecipeNutrition};
use crate::recipes::repo_types::{NewRecipe, Recipe, RecipeFilter, RecipeRow};
use crate::storage::NutritionStore;
use crate::users::repo_types::User;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    // Kept in storage shape so reads go through the same decode as Postgres.
    recipes: Vec<RecipeRow>,
    meal_plans: Vec<MealPlan>,
}

/// In-process store for tests and the `memory` backend.
/// Every write runs under one lock, which keeps slot upserts atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }

    /// Drops a recipe while leaving meal plans that point at it.
    #[cfg(test)]
    pub fn remove_recipe(&self, id: Uuid) {
        if let Ok(mut t) = self.write() {
            t.recipes.retain(|r| r.id != id);
        }
    }

    /// Inserts an entry without the slot check, to simulate legacy duplicates.
    #[cfg(test)]
    pub fn push_raw_meal_plan(&self, plan: MealPlan) {
        if let Ok(mut t) = self.write() {
            t.meal_plans.push(plan);
        }
    }

    #[cfg(test)]
    pub fn meal_plan_count(&self) -> usize {
        self.read().map(|t| t.meal_plans.len()).unwrap_or(0)
    }
}

fn sorted_recipes(rows: &[RecipeRow]) -> anyhow::Result<Vec<Recipe>> {
    let mut recipes = rows
        .iter()
        .cloned()
        .map(Recipe::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    recipes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Ok(recipes)
}

#[async_trait]
impl NutritionStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_user(&self, username: &str) -> anyhow::Result<User> {
        let mut t = self.write()?;
        if let Some(u) = t.users.iter().find(|u| u.username == username) {
            return Ok(u.clone());
        }
        let user = User::with_defaults(username);
        t.users.push(user.clone());
        Ok(user)
    }

    async fn get_recipe(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let t = self.read()?;
        t.recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(Recipe::try_from)
            .transpose()
    }

    async fn insert_recipe(&self, recipe: &NewRecipe) -> anyhow::Result<Recipe> {
        let row = RecipeRow::encode(Uuid::new_v4(), recipe)?;
        self.write()?.recipes.push(row.clone());
        Recipe::try_from(row)
    }

    async fn count_recipes(&self, filter: &RecipeFilter) -> anyhow::Result<i64> {
        let recipes = sorted_recipes(&self.read()?.recipes)?;
        Ok(recipes.iter().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        let recipes = sorted_recipes(&self.read()?.recipes)?;
        let matching = recipes
            .into_iter()
            .filter(|r| filter.matches(r))
            .skip(offset.max(0) as usize);
        Ok(match limit {
            Some(n) => matching.take(n.max(0) as usize).collect(),
            None => matching.collect(),
        })
    }

    async fn search_recipes(&self, text: &str, limit: i64) -> anyhow::Result<Vec<Recipe>> {
        let needle = text.to_lowercase();
        let recipes = sorted_recipes(&self.read()?.recipes)?;
        Ok(recipes
            .into_iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
            })
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn upsert_meal_plan(&self, plan: &NewMealPlan) -> anyhow::Result<MealPlan> {
        let mut t = self.write()?;
        if let Some(existing) = t.meal_plans.iter_mut().find(|m| {
            m.user_id == plan.user_id && m.date == plan.date && m.meal_type == plan.meal_type
        }) {
            existing.recipe_id = plan.recipe_id;
            return Ok(existing.clone());
        }
        let created = MealPlan {
            id: Uuid::new_v4(),
            user_id: plan.user_id,
            recipe_id: plan.recipe_id,
            date: plan.date,
            meal_type: plan.meal_type,
            created_at: OffsetDateTime::now_utc(),
        };
        t.meal_plans.push(created.clone());
        Ok(created)
    }

    async fn delete_meal_plan(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.write()?;
        let before = t.meal_plans.len();
        t.meal_plans.retain(|m| m.id != id);
        Ok(t.meal_plans.len() != before)
    }

    async fn list_meal_entries(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<MealPlanEntry>> {
        let t = self.read()?;
        let mut entries = Vec::new();
        for plan in t
            .meal_plans
            .iter()
            .filter(|m| m.user_id == user_id && m.date >= from && m.date <= to)
        {
            let recipe = t
                .recipes
                .iter()
                .find(|r| r.id == plan.recipe_id)
                .map(|r| RecipeNutrition {
                    name: r.name.clone(),
                    calories: r.calories,
                    protein: r.protein,
                    carbs: r.carbs,
                    fats: r.fats,
                });
            entries.push(MealPlanEntry {
                plan: plan.clone(),
                recipe,
            });
        }
        entries.sort_by(|a, b| {
            (a.plan.date, a.plan.created_at, a.plan.id).cmp(&(b.plan.date, b.plan.created_at, b.plan.id))
        });
        Ok(entries)
    }
}
