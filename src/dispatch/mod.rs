pub mod commands;
pub mod messages;

use std::path::PathBuf;
use std::sync::Arc;
use serde::Serialize;
use tracing::{error, info, warn};
use crate::auth::AllowList;
use crate::config::CrmBotConfig;
use crate::db::Database;
use crate::errors::CrmBotError;
use crate::models::{BackupArtifact, SQL_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use crate::pipeline::{Invocation, InvocationState, ReportPipeline};
use crate::reporting::ReportType;

pub use commands::BotCommand;

/// Where a document reply's content lives.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// What the chat front-end should send back to the caller.
#[derive(Debug, Clone)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Vec<Vec<String>>>,
    },
    Document {
        file_name: String,
        caption: String,
        content_type: &'static str,
        source: DocumentSource,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into(), keyboard: None }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document { .. })
    }
}

/// JSON shape of a text reply.
#[derive(Debug, Serialize)]
pub struct TextReply<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<&'a Vec<Vec<String>>>,
}

/// Routes chat commands to the pipeline after the allow-list check. Every
/// outcome, including failures, becomes exactly one reply.
pub struct Dispatcher {
    pipeline: Arc<ReportPipeline>,
    allow_list: AllowList,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<ReportPipeline>, allow_list: AllowList) -> Self {
        Self { pipeline, allow_list }
    }

    /// Open the configured database and wire the pipeline and allow-list.
    pub fn from_config(config: &CrmBotConfig) -> Result<Self, CrmBotError> {
        let db = Database::open(&config.database.path)?;
        let pipeline = ReportPipeline::from_config(config, Arc::new(db))?;
        let allow_list = AllowList::new(config.access.authorized_users.iter().copied());
        info!(
            authorized_users = allow_list.len(),
            backup_strategy = pipeline.backup_strategy(),
            "Dispatcher ready"
        );
        Ok(Self::new(Arc::new(pipeline), allow_list))
    }

    pub fn pipeline(&self) -> &ReportPipeline {
        &self.pipeline
    }

    pub async fn handle(&self, caller_id: i64, text: &str) -> Reply {
        let command = BotCommand::parse(text);
        let mut invocation = Invocation::new(caller_id, command.name());

        if !self.allow_list.is_authorized(caller_id) {
            let err = invocation.fail(InvocationState::Unauthorized, CrmBotError::Authorization(caller_id));
            warn!(invocation_id = %invocation.id, caller_id, command = %invocation.command, "{}", err);
            return Reply::text(err.classify().user_message);
        }

        let reply = match self.execute(command, &mut invocation).await {
            Ok(reply) => reply,
            Err(e) => {
                let class = e.classify();
                error!(
                    invocation_id = %invocation.id,
                    caller_id,
                    command = %invocation.command,
                    error_type = class.error_type,
                    error = %e,
                    "Command failed"
                );
                Reply::text(class.user_message)
            }
        };

        info!(
            invocation_id = %invocation.id,
            caller_id,
            command = %invocation.command,
            state = %invocation.state(),
            elapsed_ms = invocation.elapsed_ms(),
            "Command handled"
        );
        reply
    }

    async fn execute(&self, command: BotCommand, invocation: &mut Invocation) -> Result<Reply, CrmBotError> {
        invocation.advance(InvocationState::Authorized)?;
        match command {
            BotCommand::Report(report_type) => self.report(report_type, invocation).await,
            BotCommand::Backup => self.backup(invocation).await,
            BotCommand::Start => {
                invocation.advance(InvocationState::Delivered)?;
                Ok(Reply::Text {
                    text: messages::WELCOME.to_string(),
                    keyboard: Some(messages::keyboard()),
                })
            }
            BotCommand::Help => {
                invocation.advance(InvocationState::Delivered)?;
                Ok(Reply::text(messages::help_text()))
            }
            BotCommand::Unknown(_) | BotCommand::FreeText => {
                invocation.advance(InvocationState::Delivered)?;
                Ok(Reply::text(messages::FALLBACK))
            }
        }
    }

    async fn report(&self, report_type: ReportType, invocation: &mut Invocation) -> Result<Reply, CrmBotError> {
        let artifact = self.pipeline.run_report(report_type, invocation).await?;
        Ok(Reply::Document {
            file_name: artifact.file_name,
            caption: messages::report_success(report_type),
            content_type: XLSX_CONTENT_TYPE,
            source: DocumentSource::Bytes(artifact.bytes),
        })
    }

    async fn backup(&self, invocation: &mut Invocation) -> Result<Reply, CrmBotError> {
        let artifact = self.pipeline.create_backup(invocation).await?;
        let (file_name, source) = match artifact {
            BackupArtifact::InMemory { file_name, bytes } => (file_name, DocumentSource::Bytes(bytes)),
            BackupArtifact::OnDisk { file_name, path } => (file_name, DocumentSource::Path(path)),
        };
        Ok(Reply::Document {
            file_name,
            caption: messages::BACKUP_SUCCESS.to_string(),
            content_type: SQL_CONTENT_TYPE,
            source,
        })
    }
}
