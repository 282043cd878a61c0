use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CrmBotConfig {
    pub database: DatabaseConfig,
    pub access: AccessConfig,
    pub reports: ReportsConfig,
    pub backup: BackupConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Local SQLite copy of the CRM schema.
    pub path: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./data/crm.db".to_string(),
            host: None,
            port: None,
            user: None,
            password: None,
            name: None,
        }
    }
}

impl DatabaseConfig {
    /// Name used in backup headers and file names: the configured name, or
    /// the database file's stem.
    pub fn database_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("crm")
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AccessConfig {
    pub authorized_users: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// When set, every generated workbook is also kept here.
    pub output_dir: Option<String>,
    pub query_timeout_secs: u64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { output_dir: None, query_timeout_secs: 30 }
    }
}

impl ReportsConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_dir.as_ref().filter(|d| !d.is_empty()).map(PathBuf::from)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackupStrategyKind {
    #[default]
    InProcess,
    External,
}

impl BackupStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProcess => "in_process",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for BackupStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackupConfig {
    pub strategy: BackupStrategyKind,
    /// Dump utility for the external strategy.
    pub program: String,
    /// Arguments for `program`. `{path}`, `{database}`, `{host}`, `{port}`,
    /// `{user}` and `{password}` are filled from `database`; an argument
    /// whose value is unset is dropped.
    pub args: Vec<String>,
    pub output_dir: String,
    pub timeout_secs: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            strategy: BackupStrategyKind::InProcess,
            program: "sqlite3".to_string(),
            args: vec!["{path}".to_string(), ".dump".to_string()],
            output_dir: "./backups".to_string(),
            timeout_secs: 300,
        }
    }
}

impl BackupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000 }
    }
}
