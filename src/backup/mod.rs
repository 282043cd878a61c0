pub mod external;
pub mod in_process;
pub mod sql;

use std::sync::Arc;
use async_trait::async_trait;
use crate::config::{BackupStrategyKind, CrmBotConfig};
use crate::db::CrmStore;
use crate::errors::CrmBotError;
use crate::models::BackupArtifact;

pub use external::{DumpTarget, ExternalDumpBackup};
pub use in_process::SqlScriptBackup;

#[async_trait]
pub trait BackupStrategy: Send + Sync {
    async fn create_backup(&self) -> Result<BackupArtifact, CrmBotError>;
    fn name(&self) -> &'static str;
    /// Database named in backup headers and file names.
    fn database_name(&self) -> &str;
}

/// Build the configured backup strategy. Both strategies dump the store at
/// `database.path`.
pub fn create_strategy(
    config: &CrmBotConfig,
    store: Arc<dyn CrmStore>,
) -> Result<Arc<dyn BackupStrategy>, CrmBotError> {
    let db = &config.database;
    match config.backup.strategy {
        BackupStrategyKind::InProcess => Ok(Arc::new(SqlScriptBackup::new(
            store,
            db.database_name(),
            config.backup.timeout(),
        ))),
        BackupStrategyKind::External => {
            external::check_template(&config.backup.args)?;
            let target = DumpTarget {
                path: db.path.clone(),
                database: db.database_name(),
                host: db.host.clone(),
                port: db.port,
                user: db.user.clone(),
                password: db.password.clone(),
            };
            Ok(Arc::new(ExternalDumpBackup::new(
                config.backup.program.clone(),
                config.backup.args.clone(),
                target,
                config.backup.output_dir.clone(),
                config.backup.timeout(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn store() -> Arc<dyn CrmStore> {
        Arc::new(Database::in_memory().unwrap())
    }

    fn config(strategy: BackupStrategyKind) -> CrmBotConfig {
        let mut config = CrmBotConfig::default();
        config.database.path = "/srv/crm/perfex.db".into();
        config.backup.strategy = strategy;
        config
    }

    #[test]
    fn test_default_strategy_is_in_process() {
        let strategy = create_strategy(&CrmBotConfig::default(), store()).unwrap();
        assert_eq!(strategy.name(), "in_process");
    }

    #[test]
    fn test_both_strategies_dump_the_same_database() {
        let in_process = create_strategy(&config(BackupStrategyKind::InProcess), store()).unwrap();
        let external = create_strategy(&config(BackupStrategyKind::External), store()).unwrap();
        assert_eq!(external.name(), "external");
        assert_eq!(in_process.database_name(), "perfex");
        assert_eq!(external.database_name(), in_process.database_name());
    }

    #[test]
    fn test_external_default_reads_configured_file() {
        let config = config(BackupStrategyKind::External);
        let target = DumpTarget {
            path: config.database.path.clone(),
            database: config.database.database_name(),
            ..Default::default()
        };
        let dump = ExternalDumpBackup::new(
            config.backup.program.clone(),
            config.backup.args.clone(),
            target,
            "/tmp",
            config.backup.timeout(),
        );
        assert_eq!(config.backup.program, "sqlite3");
        assert_eq!(dump.arguments(), vec!["/srv/crm/perfex.db", ".dump"]);
    }

    #[test]
    fn test_external_template_must_read_store() {
        let mut config = config(BackupStrategyKind::External);
        config.backup.program = "mysqldump".into();
        config.backup.args = vec!["--host={host}".into(), "{database}".into()];
        let err = create_strategy(&config, store()).err().unwrap();
        assert!(matches!(err, CrmBotError::Config(_)));
    }
}
