use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::Date;
use uuid::Uuid;

use crate::meal_plans::repo_types::{MealPlan, MealPlanEntry, MealPlanEntryRow, MealPlanRow, NewMealPlan};
use crate::recipes::repo_types::{NewRecipe, Recipe, RecipeFilter, RecipeRow};
use crate::storage::NutritionStore;
use crate::users::repo_types::{
    User, DEFAULT_CALORIE_GOAL, DEFAULT_CARBS_GOAL, DEFAULT_FATS_GOAL, DEFAULT_PROTEIN_GOAL,
};

const RECIPE_COLUMNS: &str = r#"
    id, name, description, image_url, category, prep_time, cook_time, servings,
    calories, protein, carbs, fats, fiber, ingredients_json, instructions_json, tags_json
"#;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn decode_recipes(rows: Vec<RecipeRow>) -> anyhow::Result<Vec<Recipe>> {
    rows.into_iter().map(Recipe::try_from).collect()
}

/// `%text%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl NutritionStore for PgStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, calorie_goal, protein_goal, carbs_goal, fats_goal, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get user")?;
        Ok(user)
    }

    async fn upsert_user(&self, username: &str) -> anyhow::Result<User> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, calorie_goal, protein_goal, carbs_goal, fats_goal)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING id, username, calorie_goal, protein_goal, carbs_goal, fats_goal, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(DEFAULT_CALORIE_GOAL)
        .bind(DEFAULT_PROTEIN_GOAL)
        .bind(DEFAULT_CARBS_GOAL)
        .bind(DEFAULT_FATS_GOAL)
        .fetch_one(&self.db)
        .await
        .context("upsert user")?;
        Ok(user)
    }

    async fn get_recipe(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get recipe")?;
        row.map(Recipe::try_from).transpose()
    }

    async fn insert_recipe(&self, recipe: &NewRecipe) -> anyhow::Result<Recipe> {
        let row = RecipeRow::encode(Uuid::new_v4(), recipe)?;
        let saved = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            INSERT INTO recipes ({RECIPE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(&row.image_url)
        .bind(&row.category)
        .bind(row.prep_time)
        .bind(row.cook_time)
        .bind(row.servings)
        .bind(row.calories)
        .bind(row.protein)
        .bind(row.carbs)
        .bind(row.fats)
        .bind(row.fiber)
        .bind(&row.ingredients_json)
        .bind(&row.instructions_json)
        .bind(&row.tags_json)
        .fetch_one(&self.db)
        .await
        .context("insert recipe")?;
        Recipe::try_from(saved)
    }

    async fn count_recipes(&self, filter: &RecipeFilter) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM recipes
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR tags_json::jsonb @> $2::jsonb)
            "#,
        )
        .bind(&filter.category)
        .bind(filter.tags_json()?)
        .fetch_one(&self.db)
        .await
        .context("count recipes")?;
        Ok(count)
    }

    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        // @> on a JSON array tests element membership, so tags match exactly.
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR tags_json::jsonb @> $2::jsonb)
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&filter.category)
        .bind(filter.tags_json()?)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list recipes")?;
        decode_recipes(rows)
    }

    async fn search_recipes(&self, text: &str, limit: i64) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY name ASC, id ASC
            LIMIT $2
            "#
        ))
        .bind(like_pattern(text))
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("search recipes")?;
        decode_recipes(rows)
    }

    async fn upsert_meal_plan(&self, plan: &NewMealPlan) -> anyhow::Result<MealPlan> {
        // Single statement against UNIQUE (user_id, date, meal_type): no window
        // between the existence check and the write.
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            INSERT INTO meal_plans (id, user_id, recipe_id, date, meal_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, date, meal_type)
            DO UPDATE SET recipe_id = EXCLUDED.recipe_id
            RETURNING id, user_id, recipe_id, date, meal_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(plan.user_id)
        .bind(plan.recipe_id)
        .bind(plan.date)
        .bind(plan.meal_type.as_str())
        .fetch_one(&self.db)
        .await
        .context("upsert meal plan")?;
        MealPlan::try_from(row)
    }

    async fn delete_meal_plan(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM meal_plans WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete meal plan")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_meal_entries(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<MealPlanEntry>> {
        let rows = sqlx::query_as::<_, MealPlanEntryRow>(
            r#"
            SELECT mp.id, mp.user_id, mp.recipe_id, mp.date, mp.meal_type, mp.created_at,
                   r.name     AS recipe_name,
                   r.calories AS recipe_calories,
                   r.protein  AS recipe_protein,
                   r.carbs    AS recipe_carbs,
                   r.fats     AS recipe_fats
              FROM meal_plans mp
              LEFT JOIN recipes r ON r.id = mp.recipe_id
             WHERE mp.user_id = $1
               AND mp.date BETWEEN $2 AND $3
             ORDER BY mp.date ASC, mp.created_at ASC, mp.id ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("list meal entries")?;
        rows.into_iter().map(MealPlanEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("oat"), "%oat%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
