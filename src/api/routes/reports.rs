use axum::Json;
use crate::api::models::ReportSummary;
use crate::reporting::REPORT_CATALOG;

pub async fn list_reports() -> Json<Vec<ReportSummary>> {
    let reports = REPORT_CATALOG
        .iter()
        .map(|def| ReportSummary {
            report_type: def.report_type,
            title: def.title,
            command: format!("/{}_report", def.report_type),
        })
        .collect();
    Json(reports)
}
