use axum::{Router, routing::get};

use crate::response::{ApiResult, JsonApiResponse};

pub fn router() -> Router {
    Router::new().route("/public", get(handler))
}

async fn handler() -> ApiResult<serde_json::Value> {
    JsonApiResponse::ok(serde_json::json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
