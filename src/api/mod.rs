pub mod auth;
pub mod errors;
pub mod models;
pub mod routes;

use std::sync::Arc;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;
use crate::config::CrmBotConfig;
use crate::dispatch::Dispatcher;
use crate::errors::CrmBotError;

/// Bearer token for the command endpoints. They refuse every request
/// while it is unset.
pub const API_TOKEN_ENV: &str = "CRMBOT_API_TOKEN";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub api_token: Option<String>,
}

pub fn create_app_state(config: &CrmBotConfig) -> Result<AppState, CrmBotError> {
    let dispatcher = Dispatcher::from_config(config)?;
    let api_token = std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty());
    Ok(AppState { dispatcher: Arc::new(dispatcher), api_token })
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/reports", get(routes::reports::list_reports))
        .route("/api/commands", post(routes::commands::run_command))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::api_auth_middleware));

    Router::new()
        .route("/", get(routes::health::index))
        .route("/api/health", get(routes::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
