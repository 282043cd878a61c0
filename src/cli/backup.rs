use std::sync::Arc;
use crate::cli::commands::BackupArgs;
use crate::config::CrmBotConfig;
use crate::db::Database;
use crate::errors::CrmBotError;
use crate::models::BackupArtifact;
use crate::pipeline::{Invocation, ReportPipeline};
use crate::utils::formatting::format_duration;

pub async fn handle_backup(args: BackupArgs, config: CrmBotConfig) -> Result<(), CrmBotError> {
    let db = Database::open(&config.database.path)?;
    let pipeline = ReportPipeline::from_config(&config, Arc::new(db))?;

    let mut invocation = Invocation::local("backup");
    let path = match pipeline.create_backup(&mut invocation).await? {
        BackupArtifact::InMemory { file_name, bytes } => {
            super::write_output(&args.output, &file_name, &bytes).await?
        }
        BackupArtifact::OnDisk { path, .. } => path,
    };

    println!("{} ({})", path.display(), format_duration(invocation.elapsed_ms()));
    Ok(())
}
