use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use chrono::Local;
use tracing::{error, info};
use crate::backup::{self, BackupStrategy};
use crate::config::CrmBotConfig;
use crate::db::CrmStore;
use crate::errors::CrmBotError;
use crate::models::{BackupArtifact, ReportArtifact, ReportRow};
use crate::reporting::{enrich, render, ReportDefinition, ReportType};
use super::state::{Invocation, InvocationState};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub query_timeout: Duration,
    /// Generated workbooks are also written here when set.
    pub output_dir: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { query_timeout: Duration::from_secs(30), output_dir: None }
    }
}

/// Query, enrich and render reports; produce backups. Holds no per-call
/// state, so one instance serves concurrent invocations.
pub struct ReportPipeline {
    store: Arc<dyn CrmStore>,
    backup: Arc<dyn BackupStrategy>,
    settings: PipelineSettings,
}

impl ReportPipeline {
    pub fn new(store: Arc<dyn CrmStore>, backup: Arc<dyn BackupStrategy>, settings: PipelineSettings) -> Self {
        Self { store, backup, settings }
    }

    pub fn from_config(config: &CrmBotConfig, store: Arc<dyn CrmStore>) -> Result<Self, CrmBotError> {
        let backup = backup::create_strategy(config, Arc::clone(&store))?;
        let settings = PipelineSettings {
            query_timeout: config.reports.query_timeout(),
            output_dir: config.reports.output_path(),
        };
        Ok(Self::new(store, backup, settings))
    }

    pub fn backup_strategy(&self) -> &str {
        self.backup.name()
    }

    /// Run one report end to end. The invocation must already be authorized.
    pub async fn run_report(
        &self,
        report_type: ReportType,
        invocation: &mut Invocation,
    ) -> Result<ReportArtifact, CrmBotError> {
        let definition = report_type.definition();

        invocation.advance(InvocationState::Querying)?;
        let rows = self
            .fetch_rows(definition)
            .await
            .map_err(|e| invocation.fail(InvocationState::QueryFailed, e))?;
        info!(invocation_id = %invocation.id, report_type = %report_type, rows = rows.len(), "Query complete");

        invocation.advance(InvocationState::Enriching)?;
        let rows = enrich::enrich(rows, report_type)
            .map_err(|e| invocation.fail(InvocationState::QueryFailed, e))?;

        invocation.advance(InvocationState::Rendering)?;
        let mut artifact = render(&rows, report_type, definition.title, Local::now())
            .map_err(|e| invocation.fail(InvocationState::RenderFailed, e))?;

        if let Some(dir) = &self.settings.output_dir {
            let path = persist(dir, &artifact)
                .await
                .map_err(|e| invocation.fail(InvocationState::RenderFailed, CrmBotError::render(report_type, e)))?;
            artifact.saved_to = Some(path);
        }

        invocation.advance(InvocationState::Delivered)?;
        info!(
            invocation_id = %invocation.id,
            report_type = %report_type,
            file = %artifact.file_name,
            bytes = artifact.size(),
            "Report generated"
        );
        Ok(artifact)
    }

    /// Produce a backup with the configured strategy. The invocation must
    /// already be authorized.
    pub async fn create_backup(&self, invocation: &mut Invocation) -> Result<BackupArtifact, CrmBotError> {
        invocation.advance(InvocationState::BackingUp)?;
        let artifact = self.backup.create_backup().await.map_err(|e| {
            error!(invocation_id = %invocation.id, strategy = self.backup.name(), error = %e, "Backup failed");
            invocation.fail(InvocationState::BackupFailed, e)
        })?;
        invocation.advance(InvocationState::Delivered)?;
        info!(
            invocation_id = %invocation.id,
            strategy = self.backup.name(),
            file = %artifact.file_name(),
            "Backup created"
        );
        Ok(artifact)
    }

    async fn fetch_rows(&self, definition: &'static ReportDefinition) -> Result<Vec<ReportRow>, CrmBotError> {
        let report_type = definition.report_type;
        let store = Arc::clone(&self.store);
        let sql: &'static str = definition.query.as_str();
        let task = tokio::task::spawn_blocking(move || store.query(sql, &[]));

        // A timed-out query keeps running on the blocking pool; only the
        // caller stops waiting.
        match tokio::time::timeout(self.settings.query_timeout, task).await {
            Err(_) => Err(CrmBotError::report_generation(
                report_type,
                format!("query timed out after {}s", self.settings.query_timeout.as_secs()),
            )),
            Ok(Err(join)) => Err(CrmBotError::report_generation(report_type, format!("query task failed: {}", join))),
            Ok(Ok(Err(e))) => Err(CrmBotError::report_generation(report_type, e)),
            Ok(Ok(Ok(rows))) => Ok(rows),
        }
    }
}

/// Write via a `.partial` sibling and rename, so the final name only ever
/// holds a complete workbook.
async fn persist(dir: &Path, artifact: &ReportArtifact) -> Result<PathBuf, std::io::Error> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.file_name);
    let partial = dir.join(format!("{}.partial", artifact.file_name));
    if let Err(e) = tokio::fs::write(&partial, &artifact.bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    tokio::fs::rename(&partial, &path).await?;
    Ok(path)
}
