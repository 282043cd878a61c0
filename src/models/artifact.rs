use std::path::PathBuf;
use std::sync::LazyLock;
use chrono::{DateTime, Local};
use regex::Regex;
use crate::reporting::catalog::ReportType;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SQL_CONTENT_TYPE: &str = "application/sql";

/// Timestamp layout shared by every generated file name.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").unwrap());

/// A rendered spreadsheet, owned by the pipeline until it is handed to the
/// dispatcher.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub report_type: ReportType,
    pub title: String,
    pub file_name: String,
    pub generated_at: DateTime<Local>,
    pub bytes: Vec<u8>,
    /// Where a copy was persisted, when a report output directory is configured.
    pub saved_to: Option<PathBuf>,
}

impl ReportArtifact {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Result of one backup run. Exactly one representation is produced per
/// configured strategy.
#[derive(Debug, Clone)]
pub enum BackupArtifact {
    InMemory { file_name: String, bytes: Vec<u8> },
    OnDisk { file_name: String, path: PathBuf },
}

impl BackupArtifact {
    pub fn file_name(&self) -> &str {
        match self {
            Self::InMemory { file_name, .. } | Self::OnDisk { file_name, .. } => file_name,
        }
    }
}

/// `{report_type}_{title_slug}_{YYYYMMDD-HHMMSS}.xlsx`
pub fn report_file_name(report_type: ReportType, title: &str, at: &DateTime<Local>) -> String {
    format!(
        "{}_{}_{}.xlsx",
        report_type.as_str(),
        slugify(title),
        at.format(FILE_TIMESTAMP_FORMAT)
    )
}

/// `{database_name}-{YYYYMMDD-HHMMSS}.sql`
pub fn backup_file_name(database_name: &str, at: &DateTime<Local>) -> String {
    let name = sanitize_file_component(database_name);
    format!("{}-{}.sql", name, at.format(FILE_TIMESTAMP_FORMAT))
}

/// Lower-case the title and collapse every run of non-alphanumerics to `_`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("report");
    }
    slug
}

fn sanitize_file_component(name: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "database".to_string()
    } else {
        cleaned.to_string()
    }
}
