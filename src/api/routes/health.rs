use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::AppState;

pub async fn index() -> &'static str {
    "Bot is running!"
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "crmbot",
        "version": env!("CARGO_PKG_VERSION"),
        "backup_strategy": state.dispatcher.pipeline().backup_strategy(),
        "build": {
            "timestamp": option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            "git_hash": option_env!("GIT_HASH").unwrap_or("dev"),
        },
    }))
}
