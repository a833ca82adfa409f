use std::collections::BTreeMap;

use time::Date;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dates::{add_days, format_date, week_start};
use crate::error::{AppError, AppResult};
use crate::meal_plans::dto::{DailyStats, DayPlan, MealPlanView, SlotMeals, TrendPoint, WeekView};
use crate::meal_plans::repo_types::{MealPlanEntry, MealSlot, NewMealPlan, RecipeNutrition};
use crate::nutrition::{remaining, Macros};
use crate::storage::NutritionStore;
use crate::users::repo_types::User;

async fn require_user(store: &dyn NutritionStore, user_id: Uuid) -> AppResult<User> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

fn day_totals(entries: &[&MealPlanEntry]) -> Macros {
    entries.iter().map(|e| e.macros()).sum()
}

/// Entry that represents `slot` when several share it: earliest created, then lowest id.
fn slot_entry<'a>(entries: &[&'a MealPlanEntry], slot: MealSlot) -> Option<&'a MealPlanEntry> {
    entries
        .iter()
        .copied()
        .filter(|e| e.plan.meal_type == slot)
        .min_by(|a, b| {
            (a.plan.created_at, a.plan.id).cmp(&(b.plan.created_at, b.plan.id))
        })
}

/// Assign `recipe_id` to the user's (date, slot), replacing whatever was there.
pub async fn upsert_assignment(
    store: &dyn NutritionStore,
    user_id: Uuid,
    recipe_id: Uuid,
    date: Date,
    slot: MealSlot,
) -> AppResult<MealPlanView> {
    require_user(store, user_id).await?;
    let recipe = store
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe not found"))?;

    let plan = store
        .upsert_meal_plan(&NewMealPlan {
            user_id,
            recipe_id,
            date,
            meal_type: slot,
        })
        .await?;
    info!(meal_plan_id = %plan.id, %user_id, %recipe_id, date = %format_date(date), %slot, "meal assigned");

    let nutrition = RecipeNutrition {
        name: recipe.name,
        calories: recipe.calories,
        protein: recipe.protein,
        carbs: recipe.carbs,
        fats: recipe.fats,
    };
    Ok(MealPlanView::new(&plan, Some(&nutrition)))
}

pub async fn remove_assignment(store: &dyn NutritionStore, id: Uuid) -> AppResult<()> {
    if !store.delete_meal_plan(id).await? {
        warn!(meal_plan_id = %id, "remove of unknown meal plan");
        return Err(AppError::not_found("Meal plan not found"));
    }
    info!(meal_plan_id = %id, "meal plan removed");
    Ok(())
}

/// Log a meal for `today`; same write path as planning.
pub async fn log_now(
    store: &dyn NutritionStore,
    user_id: Uuid,
    recipe_id: Uuid,
    slot: MealSlot,
    today: Date,
) -> AppResult<MealPlanView> {
    upsert_assignment(store, user_id, recipe_id, today, slot).await
}

pub async fn daily_stats(
    store: &dyn NutritionStore,
    user_id: Uuid,
    date: Date,
) -> AppResult<DailyStats> {
    let user = require_user(store, user_id).await?;
    let entries = store.list_meal_entries(user_id, date, date).await?;
    let refs: Vec<&MealPlanEntry> = entries.iter().collect();

    let goals = user.goals();
    let consumed = day_totals(&refs);
    Ok(DailyStats {
        date,
        goals,
        consumed,
        remaining: remaining(&consumed, &goals),
        meals: entries.iter().map(MealPlanView::from).collect(),
    })
}

/// Monday-to-Sunday plan for the week containing `anchor`.
pub async fn week_view(
    store: &dyn NutritionStore,
    user_id: Uuid,
    anchor: Date,
) -> AppResult<WeekView> {
    require_user(store, user_id).await?;
    let start = week_start(anchor)?;
    let end = add_days(start, 6)?;
    let entries = store.list_meal_entries(user_id, start, end).await?;

    let mut week_plan = BTreeMap::new();
    for offset in 0..7 {
        let date = add_days(start, offset)?;
        let day: Vec<&MealPlanEntry> = entries.iter().filter(|e| e.plan.date == date).collect();

        let mut meals = SlotMeals::default();
        for slot in MealSlot::ALL {
            meals.set(slot, slot_entry(&day, slot).map(MealPlanView::from));
        }

        week_plan.insert(
            format_date(date),
            DayPlan {
                date,
                day_name: date.weekday().to_string(),
                meals,
                totals: day_totals(&day),
            },
        );
    }
    debug!(%user_id, start = %format_date(start), entries = entries.len(), "week view");
    Ok(WeekView {
        week_plan,
        start_date: start,
    })
}

/// Calories per day for the seven days ending `today`, oldest first.
pub async fn weekly_trend(
    store: &dyn NutritionStore,
    user_id: Uuid,
    today: Date,
) -> AppResult<Vec<TrendPoint>> {
    require_user(store, user_id).await?;
    let from = add_days(today, -6)?;
    let entries = store.list_meal_entries(user_id, from, today).await?;

    (0..7)
        .map(|offset| {
            let date = add_days(from, offset)?;
            let calories = entries
                .iter()
                .filter(|e| e.plan.date == date)
                .map(|e| e.macros().calories)
                .sum();
            Ok(TrendPoint { date, calories })
        })
        .collect()
}
