use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use crate::api::models::CommandRequest;
use crate::api::AppState;
use crate::dispatch::{DocumentSource, Reply, TextReply};
use crate::errors::CrmBotError;

const CAPTION_HEADER: HeaderName = HeaderName::from_static("x-caption");

/// Run a chat command on behalf of `caller_id`. Documents come back as the
/// raw file with its caption in `X-Caption`; text replies as JSON.
pub async fn run_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Response, CrmBotError> {
    let reply = state.dispatcher.handle(req.caller_id, &req.text).await;

    match reply {
        Reply::Text { text, keyboard } => {
            Ok(Json(TextReply { text: &text, keyboard: keyboard.as_ref() }).into_response())
        }
        Reply::Document { file_name, caption, content_type, source } => {
            let bytes = match source {
                DocumentSource::Bytes(bytes) => bytes,
                DocumentSource::Path(path) => tokio::fs::read(&path).await?,
            };
            let headers = [
                (header::CONTENT_TYPE, content_type.to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
                (CAPTION_HEADER, caption),
            ];
            Ok((headers, bytes).into_response())
        }
    }
}
