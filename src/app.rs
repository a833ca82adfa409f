use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::config::AppConfig;
use crate::state::AppState;
use crate::{meal_plans, pages, recipes};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(pages::router())
        .merge(recipes::router())
        .merge(meal_plans::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn app() -> Router {
        build_app(AppState::fake().await)
    }

    async fn first_recipe_id(app: &Router, q: &str) -> String {
        let (_, body) = send(app, Method::GET, &format!("/recipes/api/search?q={q}"), None).await;
        body["recipes"][0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health() {
        let app = app().await;
        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn search_endpoint() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/recipes/api/search?q=salmon", None).await;
        assert_eq!(status, StatusCode::OK);
        let recipes = body["recipes"].as_array().unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0]["name"], "Baked Salmon with Asparagus");
        assert_eq!(recipes[0]["total_time"], 30);

        let (_, empty) = send(&app, Method::GET, "/recipes/api/search?q=", None).await;
        assert_eq!(empty, json!({ "recipes": [] }));
        let (_, missing) = send(&app, Method::GET, "/recipes/api/search", None).await;
        assert_eq!(missing, json!({ "recipes": [] }));
    }

    #[tokio::test]
    async fn filter_endpoint_takes_repeated_tags() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::GET,
            "/recipes/api/filter?category=Dinner&tags=High-Protein&tags=Low-Carb",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["recipes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["Baked Salmon with Asparagus", "Turkey Meatballs with Zucchini Noodles"]
        );
    }

    #[tokio::test]
    async fn add_then_week_then_remove() {
        let app = app().await;
        let recipe_id = first_recipe_id(&app, "avocado").await;

        let (status, added) = send(
            &app,
            Method::POST,
            "/meal-planner/api/add",
            Some(json!({ "recipe_id": recipe_id, "date": "2026-10-14", "meal_type": "breakfast" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(added["success"], true);
        assert_eq!(added["meal_plan"]["date"], "2026-10-14");
        assert_eq!(added["meal_plan"]["calories"], 380.0);
        let plan_id = added["meal_plan"]["id"].as_str().unwrap().to_string();

        let (status, week) =
            send(&app, Method::GET, "/meal-planner/api/week?date=2026-10-17", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(week["start_date"], "2026-10-12");
        assert_eq!(week["week_plan"].as_object().unwrap().len(), 7);
        let wed = &week["week_plan"]["2026-10-14"];
        assert_eq!(wed["day_name"], "Wednesday");
        assert_eq!(wed["meals"]["breakfast"]["id"], plan_id.as_str());
        assert_eq!(wed["meals"]["lunch"], Value::Null);
        assert_eq!(wed["totals"]["calories"], 380.0);

        let (status, removed) = send(
            &app,
            Method::DELETE,
            &format!("/meal-planner/api/remove/{plan_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed, json!({ "success": true }));

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/meal-planner/api/remove/{plan_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn log_and_stats_for_today() {
        let app = app().await;
        let recipe_id = first_recipe_id(&app, "avocado").await;

        let (status, logged) = send(
            &app,
            Method::POST,
            "/nutrition/api/log",
            Some(json!({ "recipe_id": recipe_id, "meal_type": "breakfast" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logged["meal_plan"]["meal_type"], "breakfast");

        let (status, stats) = send(&app, Method::GET, "/nutrition/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["consumed"]["calories"], 380.0);
        assert_eq!(stats["remaining"]["calories"], 1620.0);
        assert_eq!(stats["goals"]["fats"], 65.0);
        assert_eq!(stats["meals"].as_array().unwrap().len(), 1);

        let (_, trend) = send(&app, Method::GET, "/nutrition/api/weekly-stats", None).await;
        let days = trend["week_data"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[6]["calories"], 380.0);
    }

    #[tokio::test]
    async fn log_defaults_to_lunch() {
        let app = app().await;
        let recipe_id = first_recipe_id(&app, "salad").await;
        let (_, logged) = send(
            &app,
            Method::POST,
            "/nutrition/api/log",
            Some(json!({ "recipe_id": recipe_id })),
        )
        .await;
        assert_eq!(logged["meal_plan"]["meal_type"], "lunch");
    }

    #[tokio::test]
    async fn bad_input_is_400() {
        let app = app().await;
        let recipe_id = first_recipe_id(&app, "avocado").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/meal-planner/api/add",
            Some(json!({ "recipe_id": recipe_id, "date": "14/10/2026", "meal_type": "lunch" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("YYYY-MM-DD"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/meal-planner/api/add",
            Some(json!({ "recipe_id": recipe_id, "date": "2026-10-14", "meal_type": "brunch" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/meal-planner/api/add",
            Some(json!({ "date": "2026-10-14", "meal_type": "lunch" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/nutrition/api/stats?date=nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, Method::DELETE, "/meal-planner/api/remove/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_recipe_is_404() {
        let app = app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/meal-planner/api/add",
            Some(json!({
                "recipe_id": uuid::Uuid::new_v4(),
                "date": "2026-10-14",
                "meal_type": "lunch"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/recipes/api/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pages_render_through_the_renderer() {
        let app = app().await;

        let (status, home) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(home["template"], "index.html");
        assert_eq!(home["data"]["featured_recipes"].as_array().unwrap().len(), 6);

        let (_, browse) = send(&app, Method::GET, "/recipes?category=Breakfast", None).await;
        assert_eq!(browse["template"], "recipes/browse.html");
        assert_eq!(browse["data"]["pagination"]["total"], 4);
        assert_eq!(browse["data"]["current_category"], "Breakfast");

        let (_, beyond) = send(&app, Method::GET, "/recipes?page=5", None).await;
        assert_eq!(beyond["data"]["recipes"], json!([]));

        let recipe_id = first_recipe_id(&app, "avocado").await;
        let (_, detail) = send(&app, Method::GET, &format!("/recipes/{recipe_id}"), None).await;
        assert_eq!(detail["template"], "recipes/detail.html");
        assert_eq!(detail["data"]["macros"]["fats"]["color"], "#FFCE56");
        assert_eq!(detail["data"]["calories_from_macros"], 392.0);

        let (_, dash) = send(&app, Method::GET, "/nutrition/dashboard", None).await;
        assert_eq!(dash["data"]["user"]["username"], "demo_user");
        assert_eq!(dash["data"]["stats"]["consumed"]["calories"], 0.0);

        let (_, planner) = send(&app, Method::GET, "/meal-planner", None).await;
        assert_eq!(planner["template"], "meal_planner/planner.html");
        assert_eq!(planner["data"]["week"]["week_plan"].as_object().unwrap().len(), 7);

        let (_, about) = send(&app, Method::GET, "/about", None).await;
        assert_eq!(about["template"], "about.html");
    }
}
