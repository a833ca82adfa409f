use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::dates::iso_date;
use crate::meal_plans::repo_types::{MealPlan, MealPlanEntry, MealSlot, RecipeNutrition};
use crate::nutrition::Macros;

/// A meal-plan entry as the API returns it, with the recipe's nutrition inlined.
#[derive(Debug, Clone, Serialize)]
pub struct MealPlanView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_name: Option<String>,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal_type: MealSlot,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MealPlanView {
    pub fn new(plan: &MealPlan, recipe: Option<&RecipeNutrition>) -> Self {
        let m = recipe.map(RecipeNutrition::macros).unwrap_or_default();
        Self {
            id: plan.id,
            user_id: plan.user_id,
            recipe_id: plan.recipe_id,
            recipe_name: recipe.map(|r| r.name.clone()),
            date: plan.date,
            meal_type: plan.meal_type,
            calories: m.calories,
            protein: m.protein,
            carbs: m.carbs,
            fats: m.fats,
        }
    }
}

impl From<&MealPlanEntry> for MealPlanView {
    fn from(e: &MealPlanEntry) -> Self {
        Self::new(&e.plan, e.recipe.as_ref())
    }
}

#[derive(Debug, Serialize)]
pub struct DailyStats {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub goals: Macros,
    pub consumed: Macros,
    pub remaining: Macros,
    pub meals: Vec<MealPlanView>,
}

#[derive(Debug, Default, Serialize)]
pub struct SlotMeals {
    pub breakfast: Option<MealPlanView>,
    pub lunch: Option<MealPlanView>,
    pub dinner: Option<MealPlanView>,
}

impl SlotMeals {
    pub fn set(&mut self, slot: MealSlot, view: Option<MealPlanView>) {
        match slot {
            MealSlot::Breakfast => self.breakfast = view,
            MealSlot::Lunch => self.lunch = view,
            MealSlot::Dinner => self.dinner = view,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayPlan {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub day_name: String,
    pub meals: SlotMeals,
    pub totals: Macros,
}

/// Seven days keyed by ISO date; BTreeMap keeps them in calendar order.
#[derive(Debug, Serialize)]
pub struct WeekView {
    pub week_plan: BTreeMap<String, DayPlan>,
    #[serde(with = "iso_date")]
    pub start_date: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub calories: f64,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub week_data: Vec<TrendPoint>,
}

#[derive(Debug, Deserialize)]
pub struct AddMealRequest {
    pub recipe_id: Uuid,
    pub date: String,
    pub meal_type: String,
}

#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub recipe_id: Uuid,
    #[serde(default)]
    pub meal_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub success: bool,
    pub meal_plan: MealPlanView,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
