use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use crate::errors::CrmBotError;

/// Handle to the CRM database. Every statement runs on a connection opened
/// for that call and closed afterwards, so a slow statement only holds up
/// its own caller.
#[derive(Clone)]
pub struct Database {
    target: String,
    flags: OpenFlags,
    /// Keeps a shared in-memory database alive between calls.
    _anchor: Option<Arc<Mutex<Connection>>>,
}

impl Database {
    /// Open an existing CRM database. The file must already exist.
    pub fn open(path: &str) -> Result<Self, CrmBotError> {
        if !Path::new(path).exists() {
            return Err(CrmBotError::Database(format!("Database file not found: {}", path)));
        }

        let db = Self {
            target: path.to_string(),
            flags: OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            _anchor: None,
        };
        db.connect()?;
        Ok(db)
    }

    /// Create (or open) a database file and make sure the CRM tables exist.
    pub fn create(path: &str) -> Result<Self, CrmBotError> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Self {
            target: path.to_string(),
            flags: OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            _anchor: None,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Empty in-memory database, used by tests and dry runs. Connections
    /// share it through a uniquely named shared-cache URI.
    pub fn in_memory() -> Result<Self, CrmBotError> {
        let mut db = Self {
            target: format!("file:crmbot-{}?mode=memory&cache=shared", Uuid::new_v4().simple()),
            flags: OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            _anchor: None,
        };
        let anchor = db.connect()?;
        db._anchor = Some(Arc::new(Mutex::new(anchor)));
        Ok(db)
    }

    /// Open a fresh connection for one call.
    pub(crate) fn connect(&self) -> Result<Connection, CrmBotError> {
        let conn = Connection::open_with_flags(&self.target, self.flags)
            .map_err(|e| CrmBotError::Database(format!("Failed to open database: {}", e)))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| CrmBotError::Database(format!("Failed to set busy timeout: {}", e)))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| CrmBotError::Database(format!("Failed to set pragmas: {}", e)))?;
        Ok(conn)
    }

    pub fn initialize_schema(&self) -> Result<(), CrmBotError> {
        self.connect()?
            .execute_batch(super::schema::CRM_TABLES)
            .map_err(|e| CrmBotError::Database(format!("Failed to create tables: {}", e)))
    }

    /// Run a multi-statement script, e.g. restoring an in-process backup.
    pub fn execute_script(&self, sql: &str) -> Result<(), CrmBotError> {
        self.connect()?
            .execute_batch(sql)
            .map_err(|e| CrmBotError::Database(format!("Script failed: {}", e)))
    }
}
