pub mod backup;
pub mod chat;
pub mod commands;
pub mod init_db;
pub mod report;
pub mod serve;

pub use commands::{Cli, Commands};

use std::path::{Path, PathBuf};
use crate::errors::CrmBotError;

/// Write a delivered file into `dir`, creating it if needed.
pub(crate) async fn write_output(dir: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CrmBotError> {
    let dir = Path::new(dir);
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
