use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::{debug, info};
use crate::db::CrmStore;
use crate::errors::CrmBotError;
use crate::models::{backup_file_name, BackupArtifact, CellValue};
use super::sql::{insert_statement, quote_identifier};
use super::BackupStrategy;

const LIST_TABLES: &str = "SELECT name, sql FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
const LIST_INDEXES: &str = "SELECT sql FROM sqlite_master \
     WHERE type = 'index' AND sql IS NOT NULL ORDER BY name";

/// Dumps every table through the store connection as a replayable SQL
/// script built in memory.
pub struct SqlScriptBackup {
    store: Arc<dyn CrmStore>,
    database_name: String,
    timeout: Duration,
}

impl SqlScriptBackup {
    pub fn new(store: Arc<dyn CrmStore>, database_name: impl Into<String>, timeout: Duration) -> Self {
        Self { store, database_name: database_name.into(), timeout }
    }
}

#[async_trait]
impl BackupStrategy for SqlScriptBackup {
    async fn create_backup(&self) -> Result<BackupArtifact, CrmBotError> {
        let generated_at = Local::now();
        let store = Arc::clone(&self.store);
        let name = self.database_name.clone();
        let task = tokio::task::spawn_blocking(move || build_script(store.as_ref(), &name, &generated_at));

        let script = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => {
                return Err(CrmBotError::Backup(format!(
                    "dump timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Ok(Err(join)) => return Err(CrmBotError::Backup(format!("dump task failed: {}", join))),
            Ok(Ok(result)) => result?,
        };

        let file_name = backup_file_name(&self.database_name, &generated_at);
        info!(file = %file_name, bytes = script.len(), "In-process dump complete");
        Ok(BackupArtifact::InMemory { file_name, bytes: script.into_bytes() })
    }

    fn name(&self) -> &'static str {
        "in_process"
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }
}

/// Build the full dump: header, then each table's DDL followed by one INSERT
/// per row, then index definitions.
///
/// Rows are read table by table without a snapshot, so concurrent writers
/// can make the script inconsistent across tables.
pub fn build_script(
    store: &dyn CrmStore,
    database_name: &str,
    generated_at: &DateTime<Local>,
) -> Result<String, CrmBotError> {
    let mut script = String::new();
    script.push_str(&format!("-- Database backup of {}\n", database_name));
    script.push_str(&format!("-- Generated on {}\n\n", generated_at.format("%Y-%m-%d %H:%M:%S")));

    let tables = store.query(LIST_TABLES, &[]).map_err(backup_error)?;
    for table in &tables {
        let name = text_column(table.get("name"), "name")?;
        let ddl = text_column(table.get("sql"), "sql")?;

        script.push_str(ddl.trim_end_matches(';'));
        script.push_str(";\n\n");

        let rows = store
            .query(&format!("SELECT * FROM {}", quote_identifier(name)), &[])
            .map_err(backup_error)?;
        debug!(table = %name, rows = rows.len(), "Dumped table");
        if rows.is_empty() {
            continue;
        }
        for row in &rows {
            script.push_str(&insert_statement(name, row));
            script.push('\n');
        }
        script.push('\n');
    }

    let indexes = store.query(LIST_INDEXES, &[]).map_err(backup_error)?;
    for index in &indexes {
        let ddl = text_column(index.get("sql"), "sql")?;
        script.push_str(ddl.trim_end_matches(';'));
        script.push_str(";\n");
    }

    Ok(script)
}

fn text_column<'a>(value: Option<&'a CellValue>, column: &str) -> Result<&'a str, CrmBotError> {
    value
        .and_then(CellValue::as_str)
        .ok_or_else(|| CrmBotError::Backup(format!("catalog row without {}", column)))
}

fn backup_error(e: CrmBotError) -> CrmBotError {
    match e {
        CrmBotError::Backup(_) => e,
        other => CrmBotError::Backup(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::db::Database;

    fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        db.execute_script(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT, amount REAL);
             INSERT INTO notes (id, body, amount) VALUES (1, 'it''s fine', 2.5), (2, NULL, 10);
             CREATE TABLE empty_table (id INTEGER);
             CREATE INDEX idx_notes_body ON notes (body);",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_script_header_and_inserts() {
        let db = seeded();
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let script = build_script(&db, "perfex", &at).unwrap();

        assert!(script.starts_with("-- Database backup of perfex\n-- Generated on 2024-03-01 09:30:00\n\n"));
        assert!(script.contains("CREATE TABLE notes"));
        assert!(script.contains("INSERT INTO \"notes\" (\"id\", \"body\", \"amount\") VALUES (1, 'it''s fine', 2.5);"));
        assert!(script.contains("VALUES (2, NULL, 10.0);"));
        assert!(script.contains("CREATE TABLE empty_table"));
        assert!(!script.contains("INSERT INTO \"empty_table\""));
        assert!(script.contains("CREATE INDEX idx_notes_body"));
    }

    #[test]
    fn test_script_restores_into_fresh_database() {
        let db = seeded();
        let script = build_script(&db, "perfex", &Local::now()).unwrap();

        let restored = Database::in_memory().unwrap();
        restored.execute_script(&script).unwrap();
        let rows = restored.query("SELECT id, body, amount FROM notes ORDER BY id", &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("body"), Some(&CellValue::Text("it's fine".into())));
        assert_eq!(rows[1].get("body"), Some(&CellValue::Null));
        assert_eq!(rows[1].get("amount"), Some(&CellValue::Float(10.0)));
    }

    #[test]
    fn test_empty_database_yields_header_only() {
        let db = Database::in_memory().unwrap();
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let script = build_script(&db, "empty", &at).unwrap();
        assert_eq!(script, "-- Database backup of empty\n-- Generated on 2024-03-01 09:30:00\n\n");
    }

    #[tokio::test]
    async fn test_create_backup_in_memory_artifact() {
        let strategy = SqlScriptBackup::new(Arc::new(seeded()), "perfex", Duration::from_secs(10));
        let artifact = strategy.create_backup().await.unwrap();
        match artifact {
            BackupArtifact::InMemory { file_name, bytes } => {
                assert!(file_name.starts_with("perfex-"));
                assert!(file_name.ends_with(".sql"));
                assert!(String::from_utf8(bytes).unwrap().contains("INSERT INTO \"notes\""));
            }
            other => panic!("expected in-memory artifact, got {:?}", other),
        }
        assert_eq!(strategy.name(), "in_process");
    }

    struct SlowStore(Duration);

    impl CrmStore for SlowStore {
        fn query(&self, _sql: &str, _params: &[CellValue]) -> Result<Vec<crate::models::ReportRow>, CrmBotError> {
            std::thread::sleep(self.0);
            Ok(Vec::new())
        }
        fn execute(&self, _sql: &str, _params: &[CellValue]) -> Result<usize, CrmBotError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_slow_dump_times_out_as_backup_error() {
        let strategy = SqlScriptBackup::new(
            Arc::new(SlowStore(Duration::from_secs(3))),
            "perfex",
            Duration::from_secs(1),
        );
        let err = strategy.create_backup().await.unwrap_err();
        assert!(matches!(err, CrmBotError::Backup(ref m) if m.contains("timed out after 1s")), "{}", err);
    }
}
