use std::sync::Arc;
use crate::cli::commands::ReportArgs;
use crate::config::CrmBotConfig;
use crate::db::Database;
use crate::errors::CrmBotError;
use crate::pipeline::{Invocation, ReportPipeline};
use crate::reporting::ReportType;
use crate::utils::formatting::{format_bytes, format_duration};

/// Generate a report as the local operator, bypassing the allow-list.
pub async fn handle_report(args: ReportArgs, config: CrmBotConfig) -> Result<(), CrmBotError> {
    let report_type: ReportType = args.report_type.parse()?;
    let db = Database::open(&config.database.path)?;
    let pipeline = ReportPipeline::from_config(&config, Arc::new(db))?;

    let mut invocation = Invocation::local(format!("{}_report", report_type));
    let artifact = pipeline.run_report(report_type, &mut invocation).await?;
    let path = super::write_output(&args.output, &artifact.file_name, &artifact.bytes).await?;

    println!(
        "{} ({}, {})",
        path.display(),
        format_bytes(artifact.size() as u64),
        format_duration(invocation.elapsed_ms())
    );
    Ok(())
}
