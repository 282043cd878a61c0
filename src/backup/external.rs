use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use async_trait::async_trait;
use chrono::Local;
use regex::{Captures, Regex};
use tokio::process::Command;
use tracing::{info, warn};
use crate::config::credentials::{redact_command, redact_credentials};
use crate::errors::CrmBotError;
use crate::models::{backup_file_name, BackupArtifact};
use crate::utils::truncation::truncate_error;
use super::BackupStrategy;

/// Placeholders an argument template may use.
pub const PLACEHOLDERS: [&str; 6] = ["path", "database", "host", "port", "user", "password"];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// The store being dumped. `path` is the database file every report reads.
#[derive(Debug, Clone, Default)]
pub struct DumpTarget {
    pub path: String,
    pub database: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DumpTarget {
    fn value(&self, key: &str) -> Option<String> {
        match key {
            "path" => Some(self.path.clone()),
            "database" => Some(self.database.clone()),
            "host" => self.host.clone(),
            "port" => self.port.map(|p| p.to_string()),
            "user" => self.user.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
        .filter(|v| !v.is_empty())
    }

    /// Substitute placeholders in one template argument. `None` when a
    /// referenced value is unset, so the argument is left out.
    pub fn expand(&self, template: &str) -> Option<String> {
        let mut missing = false;
        let expanded = PLACEHOLDER.replace_all(template, |caps: &Captures| match self.value(&caps[1]) {
            Some(v) => v,
            None => {
                missing = true;
                String::new()
            }
        });
        if missing {
            None
        } else {
            Some(expanded.into_owned())
        }
    }
}

/// Reject argument templates that would dump anything other than the
/// configured database file.
pub fn check_template(args: &[String]) -> Result<(), CrmBotError> {
    for arg in args {
        for caps in PLACEHOLDER.captures_iter(arg) {
            if !PLACEHOLDERS.contains(&&caps[1]) {
                return Err(CrmBotError::Config(format!(
                    "Unknown placeholder {{{}}} in backup.args",
                    &caps[1]
                )));
            }
        }
    }
    if !args.iter().any(|a| a.contains("{path}")) {
        return Err(CrmBotError::Config(
            "backup.args must pass {path} so the dump reads the configured database".into(),
        ));
    }
    Ok(())
}

/// Runs an external dump program (`sqlite3 <path> .dump` by default) with
/// its stdout redirected into a timestamped file under `output_dir`.
pub struct ExternalDumpBackup {
    program: String,
    args: Vec<String>,
    target: DumpTarget,
    output_dir: PathBuf,
    timeout: Duration,
}

impl ExternalDumpBackup {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        target: DumpTarget,
        output_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            target,
            output_dir: output_dir.into(),
            timeout,
        }
    }

    pub fn arguments(&self) -> Vec<String> {
        self.args.iter().filter_map(|a| self.target.expand(a)).collect()
    }

    fn secrets(&self) -> Vec<&str> {
        self.target.password.as_deref().into_iter().collect()
    }

    async fn run_dump(&self, args: &[String], path: &Path) -> Result<(), CrmBotError> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| CrmBotError::Backup(format!("Cannot create {}: {}", path.display(), e)))?
            .into_std()
            .await;

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CrmBotError::Backup(format!("Failed to start {}: {}", self.program, e)))?;

        // Dropping the child on timeout kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CrmBotError::Backup(format!(
                "{} timed out after {}s",
                self.program,
                self.timeout.as_secs()
            )))?
            .map_err(|e| CrmBotError::Backup(format!("Failed waiting for {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CrmBotError::Backup(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                truncate_error(&redact_credentials(stderr.trim(), &self.secrets()))
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BackupStrategy for ExternalDumpBackup {
    async fn create_backup(&self) -> Result<BackupArtifact, CrmBotError> {
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            CrmBotError::Backup(format!("Cannot create backup directory {}: {}", self.output_dir.display(), e))
        })?;

        let file_name = backup_file_name(&self.target.database, &Local::now());
        let path = self.output_dir.join(&file_name);
        let args = self.arguments();
        info!(
            command = %redact_credentials(
                &redact_command(&format!("{} {}", self.program, args.join(" "))),
                &self.secrets()
            ),
            path = %path.display(),
            "Running external dump"
        );

        match self.run_dump(&args, &path).await {
            Ok(()) => Ok(BackupArtifact::OnDisk { file_name, path }),
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %rm, "Failed to remove partial dump");
                    }
                }
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "external"
    }

    fn database_name(&self) -> &str {
        &self.target.database
    }
}
