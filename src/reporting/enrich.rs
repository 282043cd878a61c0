use chrono::Month;
use crate::errors::CrmBotError;
use crate::models::{CellValue, ReportRow};
use super::catalog::ReportType;

/// Apply the catalog's enrichment for `report_type` to query results.
pub fn enrich(rows: Vec<ReportRow>, report_type: ReportType) -> Result<Vec<ReportRow>, CrmBotError> {
    (report_type.definition().enrich)(report_type, rows)
}

/// Detail reports carry their derived columns in SQL already.
pub fn identity(_report_type: ReportType, rows: Vec<ReportRow>) -> Result<Vec<ReportRow>, CrmBotError> {
    Ok(rows)
}

/// Add `month_name` and `period` ("March 2024") to time-bucketed rows.
///
/// A month outside 1..=12, or a missing year, fails the whole report rather
/// than producing a mislabelled row.
pub fn add_period_labels(report_type: ReportType, mut rows: Vec<ReportRow>) -> Result<Vec<ReportRow>, CrmBotError> {
    for (idx, row) in rows.iter_mut().enumerate() {
        let month = row.get("month").cloned().unwrap_or(CellValue::Null);
        let name = month_name(&month).map_err(|cause| {
            CrmBotError::report_generation(report_type, format!("row {}: {}", idx, cause))
        })?;

        let year = row.get("year")
            .and_then(CellValue::as_i64)
            .ok_or_else(|| CrmBotError::report_generation(
                report_type,
                format!("row {}: missing or non-numeric year", idx),
            ))?;

        row.insert("month_name", name);
        row.insert("period", format!("{} {}", name, year));
    }
    Ok(rows)
}

/// English month name for a numeric month value (1 = January).
pub fn month_name(value: &CellValue) -> Result<&'static str, String> {
    let number = value
        .as_i64()
        .ok_or_else(|| format!("month value {:?} is not a number", value))?;
    let number = u8::try_from(number)
        .map_err(|_| format!("month {} is out of range 1-12", number))?;
    Month::try_from(number)
        .map(|m| m.name())
        .map_err(|_| format!("month {} is out of range 1-12", number))
}
