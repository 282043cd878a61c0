use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crmbot", version, about = "Chat-driven reporting and backup front-end for a CRM database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true, default_value = "crmbot.yaml")]
    pub config: String,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server that accepts chat commands
    Serve(ServeArgs),
    /// Generate one report to a file
    Report(ReportArgs),
    /// Create a database backup
    Backup(BackupArgs),
    /// Run a chat message through the dispatcher as a given caller
    Chat(ChatArgs),
    /// Create a database file with the CRM tables
    InitDb(InitDbArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    /// Report type: sales, payments, invoices, estimates, proposals
    pub report_type: String,

    /// Output directory for the workbook
    #[arg(short, long, default_value = ".")]
    pub output: String,
}

#[derive(Args, Clone)]
pub struct BackupArgs {
    /// Where to write an in-memory dump
    #[arg(short, long, default_value = ".")]
    pub output: String,
}

#[derive(Args, Clone)]
pub struct ChatArgs {
    /// Chat user id of the caller
    #[arg(long, allow_negative_numbers = true)]
    pub caller: i64,

    /// Message text, e.g. "/sales_report"
    pub text: String,

    /// Directory for document replies
    #[arg(short, long, default_value = ".")]
    pub output: String,
}

#[derive(Args, Clone)]
pub struct InitDbArgs {
    /// Database file to create (defaults to database.path)
    pub path: Option<String>,

    /// Insert a small sample data set
    #[arg(long)]
    pub sample: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Path to YAML config file
    pub config: String,
}
