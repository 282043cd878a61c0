use std::path::Path;
use crate::auth::allow_list::parse_ids;
use crate::backup::external::check_template;
use crate::errors::CrmBotError;
use super::credentials::resolve_credential;
use super::types::{BackupStrategyKind, CrmBotConfig};
use super::schema::CONFIG_SCHEMA;
use tracing::{info, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Load configuration from `path` (or defaults when absent), then apply
/// environment overrides and validate.
pub async fn load_config(path: Option<&Path>) -> Result<CrmBotConfig, CrmBotError> {
    let mut config = match path {
        Some(p) if p.exists() => parse_config(p).await?,
        Some(p) => {
            info!(path = %p.display(), "Config file not found, using defaults");
            CrmBotConfig::default()
        }
        None => CrmBotConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    resolve_credentials(&mut config);
    validate_conflicts(&config)?;
    Ok(config)
}

/// Parse and schema-check a config file without environment overrides.
pub async fn parse_config(path: &Path) -> Result<CrmBotConfig, CrmBotError> {
    if !path.exists() {
        return Err(CrmBotError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(CrmBotError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<CrmBotConfig, CrmBotError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    // An empty file parses as null.
    if yaml.is_null() {
        return Ok(CrmBotConfig::default());
    }

    validate_schema(&yaml)?;

    let config: CrmBotConfig = serde_yaml::from_value(yaml)?;
    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), CrmBotError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| CrmBotError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| CrmBotError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        let messages: Vec<String> = errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();
        if !messages.is_empty() {
            return Err(CrmBotError::Config(format!("Invalid configuration: {}", messages.join("; "))));
        }
    }

    Ok(())
}

/// Environment variables take precedence over the file.
pub fn apply_env_overrides<F>(config: &mut CrmBotConfig, lookup: F) -> Result<(), CrmBotError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("DB_PATH") {
        config.database.path = v;
    }
    if let Some(v) = lookup("DB_HOST") {
        config.database.host = Some(v);
    }
    if let Some(v) = lookup("DB_USER") {
        config.database.user = Some(v);
    }
    if let Some(v) = lookup("DB_PASSWORD") {
        config.database.password = Some(v);
    }
    if let Some(v) = lookup("DB_NAME") {
        config.database.name = Some(v);
    }
    if let Some(v) = lookup("AUTHORIZED_USERS") {
        config.access.authorized_users = parse_ids(&v)?;
    }
    if let Some(v) = lookup("REPORTS_DIR") {
        config.reports.output_dir = Some(v);
    }
    if let Some(v) = lookup("BACKUP_DIR") {
        config.backup.output_dir = v;
    }
    Ok(())
}

fn resolve_credentials(config: &mut CrmBotConfig) {
    let db = &mut config.database;
    for field in [&mut db.user, &mut db.password] {
        if let Some(value) = field.as_mut() {
            *value = resolve_credential(value);
        }
    }
}

/// Detect semantic conflicts in the parsed configuration.
pub fn validate_conflicts(config: &CrmBotConfig) -> Result<(), CrmBotError> {
    if config.backup.strategy == BackupStrategyKind::External {
        check_template(&config.backup.args)?;
        if config.backup.output_dir.is_empty() {
            return Err(CrmBotError::Config("External backup strategy requires backup.output_dir".into()));
        }
    }

    if config.reports.query_timeout_secs == 0 || config.backup.timeout_secs == 0 {
        return Err(CrmBotError::Config("Timeouts must be at least one second".into()));
    }

    if config.access.authorized_users.is_empty() {
        warn!("No authorized users configured; every chat command will be refused");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
database:
  path: /srv/crm.db
  name: perfex
access:
  authorized_users: [111, 222]
reports:
  output_dir: /srv/reports
  query_timeout_secs: 10
backup:
  strategy: in_process
server:
  port: 8081
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.database.path, "/srv/crm.db");
        assert_eq!(config.access.authorized_users, vec![111, 222]);
        assert_eq!(config.reports.query_timeout_secs, 10);
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config.database.path, "./data/crm.db");
    }

    #[test]
    fn test_schema_rejects_unknown_strategy() {
        let err = parse_config_str("backup:\n  strategy: ftp\n").unwrap_err();
        assert!(matches!(err, CrmBotError::Config(_)));
    }

    #[test]
    fn test_schema_rejects_unknown_section() {
        assert!(parse_config_str("llm:\n  provider: x\n").is_err());
    }

    #[test]
    fn test_schema_rejects_string_user_ids() {
        assert!(parse_config_str("access:\n  authorized_users: [\"abc\"]\n").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = parse_config_str("access:\n  authorized_users: [1]\n").unwrap();
        apply_env_overrides(&mut config, env(&[
            ("AUTHORIZED_USERS", "5,6"),
            ("DB_NAME", "perfex"),
            ("REPORTS_DIR", "/tmp/reports"),
            ("BACKUP_DIR", "/tmp/backups"),
        ])).unwrap();
        assert_eq!(config.access.authorized_users, vec![5, 6]);
        assert_eq!(config.database.name.as_deref(), Some("perfex"));
        assert_eq!(config.reports.output_dir.as_deref(), Some("/tmp/reports"));
        assert_eq!(config.backup.output_dir, "/tmp/backups");
    }

    #[test]
    fn test_env_bad_allow_list_is_config_error() {
        let mut config = CrmBotConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("AUTHORIZED_USERS", "12,x")])).unwrap_err();
        assert!(matches!(err, CrmBotError::Config(_)));
    }

    #[test]
    fn test_external_strategy_must_dump_configured_file() {
        let mut config = CrmBotConfig::default();
        config.backup.strategy = BackupStrategyKind::External;
        assert!(validate_conflicts(&config).is_ok());

        config.backup.program = "mysqldump".into();
        config.backup.args = vec!["--host={host}".into(), "--user={user}".into(), "{database}".into()];
        let err = validate_conflicts(&config).unwrap_err();
        assert!(err.to_string().contains("{path}"));
    }

    #[test]
    fn test_external_strategy_requires_output_dir() {
        let mut config = CrmBotConfig::default();
        config.backup.strategy = BackupStrategyKind::External;
        config.backup.output_dir = String::new();
        assert!(validate_conflicts(&config).is_err());
    }

    #[test]
    fn test_schema_accepts_dump_args() {
        let config = parse_config_str("backup:\n  strategy: external\n  args: [\"{path}\", \".dump\"]\n").unwrap();
        assert_eq!(config.backup.args, vec!["{path}", ".dump"]);
        assert!(parse_config_str("backup:\n  args: []\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = CrmBotConfig::default();
        config.reports.query_timeout_secs = 0;
        assert!(validate_conflicts(&config).is_err());
    }

    #[test]
    fn test_empty_allow_list_is_only_a_warning() {
        assert!(validate_conflicts(&CrmBotConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_parse_config_missing_file() {
        let err = parse_config(Path::new("/nonexistent/crmbot.yaml")).await.unwrap_err();
        assert!(matches!(err, CrmBotError::Config(_)));
    }

    #[tokio::test]
    async fn test_parse_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crmbot.yaml");
        tokio::fs::write(&path, "server:\n  port: 9000\n").await.unwrap();
        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.server.port, 9000);
    }
}
