use serde::{Deserialize, Serialize};
use crate::reporting::ReportType;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub caller_id: i64,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub report_type: ReportType,
    pub title: &'static str,
    pub command: String,
}
