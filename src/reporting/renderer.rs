use chrono::{DateTime, Local};
use rust_xlsxwriter::{Chart, ChartType, ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use tracing::debug;
use crate::errors::CrmBotError;
use crate::models::{report_file_name, CellValue, ReportArtifact, ReportRow};
use super::catalog::ReportType;

pub const SHEET_NAME: &str = "Report";
/// Column whose presence triggers the chart.
pub const CHART_VALUE_COLUMN: &str = "total";
pub const CHART_SERIES_NAME: &str = "Total";
pub const CHART_X_AXIS: &str = "Items";
pub const CHART_Y_AXIS: &str = "Amount";

const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;
/// Longest text an xlsx cell holds, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Render rows into an xlsx workbook held in memory.
///
/// The header follows the first row's column order; later rows missing a
/// column leave that cell empty.
pub fn render(
    rows: &[ReportRow],
    report_type: ReportType,
    title: &str,
    generated_at: DateTime<Local>,
) -> Result<ReportArtifact, CrmBotError> {
    let bytes = build_workbook(rows, title).map_err(|e| CrmBotError::render(report_type, e))?;
    debug!(report_type = %report_type, rows = rows.len(), bytes = bytes.len(), "Workbook rendered");

    Ok(ReportArtifact {
        report_type,
        title: title.to_string(),
        file_name: report_file_name(report_type, title, &generated_at),
        generated_at,
        bytes,
        saved_to: None,
    })
}

fn build_workbook(rows: &[ReportRow], title: &str) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    if let Some(first) = rows.first() {
        let columns: Vec<&str> = first.columns().collect();
        if columns.len() > MAX_COLUMNS {
            return Err(format!("{} columns exceed the sheet limit of {}", columns.len(), MAX_COLUMNS));
        }
        if rows.len() + 1 > MAX_ROWS {
            return Err(format!("{} rows exceed the sheet limit of {}", rows.len(), MAX_ROWS - 1));
        }

        write_header(worksheet, &columns)?;
        for (idx, row) in rows.iter().enumerate() {
            write_row(worksheet, (idx + 1) as RowNum, &columns, row)?;
        }

        if let Some(value_col) = columns.iter().position(|c| *c == CHART_VALUE_COLUMN) {
            let chart = total_chart(title, rows.len() as RowNum, value_col as ColNum);
            // One column gap to the right of the data.
            let anchor_col = (columns.len() + 1).min(MAX_COLUMNS - 1) as ColNum;
            worksheet.insert_chart(1, anchor_col, &chart).map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str]) -> Result<(), String> {
    let bold = Format::new().set_bold();
    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as ColNum, cell_text(name.to_string()), &bold)
            .map_err(xlsx_error)?;
    }
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, row_num: RowNum, columns: &[&str], row: &ReportRow) -> Result<(), String> {
    for (col, name) in columns.iter().enumerate() {
        let col = col as ColNum;
        match row.get(name) {
            None | Some(CellValue::Null) => {}
            Some(CellValue::Integer(i)) => {
                worksheet.write_number(row_num, col, *i as f64).map_err(xlsx_error)?;
            }
            Some(CellValue::Float(f)) if f.is_finite() => {
                worksheet.write_number(row_num, col, *f).map_err(xlsx_error)?;
            }
            Some(other) => {
                worksheet.write_string(row_num, col, cell_text(other.to_string())).map_err(xlsx_error)?;
            }
        }
    }
    Ok(())
}

/// Cut text to what a cell can hold.
fn cell_text(mut text: String) -> String {
    if let Some((idx, _)) = text.char_indices().nth(MAX_CELL_CHARS) {
        text.truncate(idx);
    }
    text
}

/// Column chart of the `total` column, categories taken from the first
/// column over the same data rows.
fn total_chart(title: &str, data_rows: RowNum, value_col: ColNum) -> Chart {
    let first_row: RowNum = 1;
    let category_col: ColNum = 0;
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_name(CHART_SERIES_NAME)
        .set_categories((SHEET_NAME, first_row, category_col, data_rows, category_col))
        .set_values((SHEET_NAME, first_row, value_col, data_rows, value_col));
    chart.title().set_name(title);
    chart.x_axis().set_name(CHART_X_AXIS);
    chart.y_axis().set_name(CHART_Y_AXIS);
    chart
}

fn xlsx_error(e: XlsxError) -> String {
    e.to_string()
}
