use thiserror::Error;
use crate::reporting::catalog::ReportType;

#[derive(Debug, Error)]
pub enum CrmBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Caller {0} is not on the allow-list")]
    Authorization(i64),

    #[error("Failed to generate {report_type} report: {cause}")]
    ReportGeneration {
        report_type: ReportType,
        cause: String,
    },

    #[error("Failed to render {report_type} report: {cause}")]
    Render {
        report_type: ReportType,
        cause: String,
    },

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrmBotError {
    pub fn report_generation(report_type: ReportType, cause: impl std::fmt::Display) -> Self {
        Self::ReportGeneration {
            report_type,
            cause: cause.to_string(),
        }
    }

    pub fn render(report_type: ReportType, cause: impl std::fmt::Display) -> Self {
        Self::Render {
            report_type,
            cause: cause.to_string(),
        }
    }
}
