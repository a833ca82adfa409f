use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Turns a template name plus already-computed data into a response.
pub trait PageRenderer: Send + Sync {
    fn render(&self, template: &str, data: Value) -> Response;
}

/// Emits `{template, data}` so any front end can do the actual rendering.
#[derive(Clone, Default)]
pub struct JsonRenderer;

impl PageRenderer for JsonRenderer {
    fn render(&self, template: &str, data: Value) -> Response {
        Json(json!({ "template": template, "data": data })).into_response()
    }
}
