use crate::api;
use crate::cli::commands::ServeArgs;
use crate::config::CrmBotConfig;
use crate::errors::CrmBotError;
use tracing::{info, warn};

pub async fn handle_serve(args: ServeArgs, config: CrmBotConfig) -> Result<(), CrmBotError> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    info!(host = %host, port, "Starting API server");

    let state = api::create_app_state(&config)?;
    if state.api_token.is_none() {
        warn!("{} is not set; /api/commands and /api/reports will refuse requests", api::API_TOKEN_ENV);
    }
    let app = api::build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| CrmBotError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
