use std::path::Path;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use crmbot::{cli, config, errors};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.with_ansi(!cli.no_color).init();
    }

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            errors::CrmBotError::Config(_) | errors::CrmBotError::Yaml(_) => 2,
            errors::CrmBotError::Authorization(_) => 4,
            errors::CrmBotError::ReportGeneration { .. } | errors::CrmBotError::Render { .. } => 5,
            errors::CrmBotError::Backup(_) => 6,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: cli::Cli) -> Result<(), errors::CrmBotError> {
    if let cli::Commands::Validate(args) = &cli.command {
        return handle_validate(args).await;
    }

    let config = config::load_config(Some(Path::new(&cli.config))).await?;
    match cli.command {
        cli::Commands::Serve(args) => cli::serve::handle_serve(args, config).await,
        cli::Commands::Report(args) => cli::report::handle_report(args, config).await,
        cli::Commands::Backup(args) => cli::backup::handle_backup(args, config).await,
        cli::Commands::Chat(args) => cli::chat::handle_chat(args, config).await,
        cli::Commands::InitDb(args) => cli::init_db::handle_init_db(args, config).await,
        cli::Commands::Validate(_) => Ok(()),
    }
}

async fn handle_validate(args: &cli::commands::ValidateArgs) -> Result<(), errors::CrmBotError> {
    let path = std::path::PathBuf::from(&args.config);
    let config = config::parse_config(&path).await?;
    config::parser::validate_conflicts(&config)?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
