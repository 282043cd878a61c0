use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::CrmBotError;

impl IntoResponse for CrmBotError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            CrmBotError::Config(_) => StatusCode::BAD_REQUEST,
            CrmBotError::Authorization(_) => StatusCode::FORBIDDEN,
            CrmBotError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let class = self.classify();
        tracing::error!(error_type = class.error_type, error = %self, "Request failed");

        (status, Json(json!({"error": class.user_message, "error_type": class.error_type}))).into_response()
    }
}
