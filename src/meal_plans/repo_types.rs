use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::AppError;
use crate::nutrition::Macros;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            _ => Err(AppError::invalid(format!(
                "invalid meal_type '{s}', expected breakfast, lunch or dinner"
            ))),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub date: Date,
    pub meal_type: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub date: Date,
    pub meal_type: MealSlot,
    pub created_at: OffsetDateTime,
}

impl TryFrom<MealPlanRow> for MealPlan {
    type Error = anyhow::Error;

    fn try_from(r: MealPlanRow) -> anyhow::Result<Self> {
        let meal_type = r
            .meal_type
            .parse::<MealSlot>()
            .map_err(|e| anyhow::anyhow!("stored meal plan {}: {}", r.id, e))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            recipe_id: r.recipe_id,
            date: r.date,
            meal_type,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub date: Date,
    pub meal_type: MealSlot,
}

/// The slice of a recipe that meal-plan views need.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeNutrition {
    pub name: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl RecipeNutrition {
    pub fn macros(&self) -> Macros {
        Macros::new(
            self.calories,
            self.protein.unwrap_or(0.0),
            self.carbs.unwrap_or(0.0),
            self.fats.unwrap_or(0.0),
        )
    }
}

/// A meal-plan entry joined with its recipe, if the recipe still exists.
#[derive(Debug, Clone)]
pub struct MealPlanEntry {
    pub plan: MealPlan,
    pub recipe: Option<RecipeNutrition>,
}

impl MealPlanEntry {
    /// Zero when the recipe no longer resolves.
    pub fn macros(&self) -> Macros {
        self.recipe
            .as_ref()
            .map(RecipeNutrition::macros)
            .unwrap_or_default()
    }
}

/// LEFT JOIN of meal_plans and recipes.
#[derive(Debug, FromRow)]
pub struct MealPlanEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub date: Date,
    pub meal_type: String,
    pub created_at: OffsetDateTime,
    pub recipe_name: Option<String>,
    pub recipe_calories: Option<f64>,
    pub recipe_protein: Option<f64>,
    pub recipe_carbs: Option<f64>,
    pub recipe_fats: Option<f64>,
}

impl TryFrom<MealPlanEntryRow> for MealPlanEntry {
    type Error = anyhow::Error;

    fn try_from(r: MealPlanEntryRow) -> anyhow::Result<Self> {
        let recipe = match (r.recipe_name, r.recipe_calories) {
            (Some(name), Some(calories)) => Some(RecipeNutrition {
                name,
                calories,
                protein: r.recipe_protein,
                carbs: r.recipe_carbs,
                fats: r.recipe_fats,
            }),
            _ => None,
        };
        let plan = MealPlan::try_from(MealPlanRow {
            id: r.id,
            user_id: r.user_id,
            recipe_id: r.recipe_id,
            date: r.date,
            meal_type: r.meal_type,
            created_at: r.created_at,
        })?;
        Ok(Self { plan, recipe })
    }
}
