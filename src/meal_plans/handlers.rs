use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    dates::{parse_date, today},
    error::{AppError, AppResult},
    meal_plans::{
        dto::{
            AddMealRequest, DailyStats, DateQuery, LogMealRequest, MealPlanResponse,
            SuccessResponse, TrendResponse, WeekView,
        },
        repo_types::MealSlot,
        services,
    },
    nutrition::macro_breakdown,
    state::AppState,
};

pub fn planner_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-planner", get(planner_page))
        .route("/meal-planner/api/add", post(add_to_plan))
        .route("/meal-planner/api/remove/:id", delete(remove_from_plan))
        .route("/meal-planner/api/week", get(get_week))
}

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/dashboard", get(dashboard_page))
        .route("/nutrition/api/log", post(log_meal))
        .route("/nutrition/api/stats", get(get_stats))
        .route("/nutrition/api/weekly-stats", get(weekly_stats))
}

fn date_or_today(q: &DateQuery) -> AppResult<time::Date> {
    match q.date.as_deref() {
        Some(s) if !s.trim().is_empty() => parse_date(s),
        _ => Ok(today()),
    }
}

async fn current_user(state: &AppState) -> AppResult<crate::users::repo_types::User> {
    state.store.get_user(state.user_id).await?.ok_or_else(|| {
        error!(user_id = %state.user_id, "provisioned user missing");
        AppError::not_found("User not found")
    })
}

#[instrument(skip(state))]
pub async fn planner_page(State(state): State<AppState>) -> AppResult<Response> {
    let user = current_user(&state).await?;
    let week = services::week_view(state.store.as_ref(), user.id, today()).await?;
    Ok(state.renderer.render(
        "meal_planner/planner.html",
        json!({ "user": user, "week": week }),
    ))
}

#[instrument(skip(state, body))]
pub async fn add_to_plan(
    State(state): State<AppState>,
    body: Result<Json<AddMealRequest>, JsonRejection>,
) -> AppResult<Json<MealPlanResponse>> {
    let Json(body) = body?;
    let date = parse_date(&body.date)?;
    let slot: MealSlot = body.meal_type.parse()?;
    let meal_plan =
        services::upsert_assignment(state.store.as_ref(), state.user_id, body.recipe_id, date, slot)
            .await?;
    Ok(Json(MealPlanResponse {
        success: true,
        meal_plan,
    }))
}

#[instrument(skip(state))]
pub async fn remove_from_plan(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<SuccessResponse>> {
    let Path(id) = id?;
    services::remove_assignment(state.store.as_ref(), id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Week containing `?date=` (default today).
#[instrument(skip(state))]
pub async fn get_week(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> AppResult<Json<WeekView>> {
    let Query(q) = query?;
    let anchor = date_or_today(&q)?;
    let week = services::week_view(state.store.as_ref(), state.user_id, anchor).await?;
    Ok(Json(week))
}

#[instrument(skip(state))]
pub async fn dashboard_page(State(state): State<AppState>) -> AppResult<Response> {
    let user = current_user(&state).await?;
    let stats = services::daily_stats(state.store.as_ref(), user.id, today()).await?;
    let breakdown = macro_breakdown(&stats.consumed);
    Ok(state.renderer.render(
        "nutrition/dashboard.html",
        json!({ "user": user, "stats": stats, "macros": breakdown }),
    ))
}

#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    body: Result<Json<LogMealRequest>, JsonRejection>,
) -> AppResult<Json<MealPlanResponse>> {
    let Json(body) = body?;
    let slot = match body.meal_type.as_deref() {
        Some(s) => s.parse()?,
        None => MealSlot::Lunch,
    };
    let meal_plan =
        services::log_now(state.store.as_ref(), state.user_id, body.recipe_id, slot, today())
            .await?;
    Ok(Json(MealPlanResponse {
        success: true,
        meal_plan,
    }))
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> AppResult<Json<DailyStats>> {
    let Query(q) = query?;
    let date = date_or_today(&q)?;
    let stats = services::daily_stats(state.store.as_ref(), state.user_id, date).await?;
    Ok(Json(stats))
}

#[instrument(skip(state))]
pub async fn weekly_stats(State(state): State<AppState>) -> AppResult<Json<TrendResponse>> {
    let week_data = services::weekly_trend(state.store.as_ref(), state.user_id, today()).await?;
    Ok(Json(TrendResponse { week_data }))
}
