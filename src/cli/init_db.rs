use crate::cli::commands::InitDbArgs;
use crate::config::CrmBotConfig;
use crate::db::{schema, Database};
use crate::errors::CrmBotError;
use tracing::info;

pub async fn handle_init_db(args: InitDbArgs, config: CrmBotConfig) -> Result<(), CrmBotError> {
    let path = args.path.unwrap_or(config.database.path);
    let db = Database::create(&path)?;
    if args.sample {
        db.execute_script(schema::SAMPLE_DATA)?;
        info!(path = %path, "Inserted sample data");
    }
    println!("Database ready: {}", path);
    Ok(())
}
