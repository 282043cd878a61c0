use crate::errors::CrmBotError;
use crate::models::{CellValue, ReportRow};
use super::Database;

/// Synchronous query/execute boundary over the CRM relational store.
///
/// Implementations are called from blocking tasks; each call opens its own
/// connection, runs one statement, and closes it.
pub trait CrmStore: Send + Sync {
    /// Run a read statement and return every row as an ordered column map.
    fn query(&self, sql: &str, params: &[CellValue]) -> Result<Vec<ReportRow>, CrmBotError>;

    /// Run a write statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[CellValue]) -> Result<usize, CrmBotError>;
}

impl CrmStore for Database {
    fn query(&self, sql: &str, params: &[CellValue]) -> Result<Vec<ReportRow>, CrmBotError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)
            .map_err(|e| CrmBotError::Database(format!("Query failed: {}", e)))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))
            .map_err(|e| CrmBotError::Database(format!("Query error: {}", e)))?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()
            .map_err(|e| CrmBotError::Database(format!("Row error: {}", e)))?
        {
            let mut record = ReportRow::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                let value = row.get_ref(idx)
                    .map_err(|e| CrmBotError::Database(format!("Column error: {}", e)))?;
                record.insert(name.clone(), CellValue::from(value));
            }
            results.push(record);
        }
        Ok(results)
    }

    fn execute(&self, sql: &str, params: &[CellValue]) -> Result<usize, CrmBotError> {
        let conn = self.connect()?;
        conn.execute(sql, rusqlite::params_from_iter(params.iter()))
            .map_err(|e| CrmBotError::Database(format!("Execute failed: {}", e)))
    }
}
