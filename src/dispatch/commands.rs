use crate::reporting::ReportType;

/// A parsed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Backup,
    Report(ReportType),
    /// A slash command the bot does not know.
    Unknown(String),
    /// Anything that is not a slash command.
    FreeText,
}

impl BotCommand {
    /// Parse message text. Only the first word counts; a trailing
    /// `@botname` is ignored and matching is case-insensitive.
    pub fn parse(text: &str) -> Self {
        let Some(word) = text.split_whitespace().next() else {
            return Self::FreeText;
        };
        let Some(command) = word.strip_prefix('/') else {
            return Self::FreeText;
        };
        let command = command.split('@').next().unwrap_or_default().to_ascii_lowercase();

        match command.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "backup" => Self::Backup,
            name => match ReportType::from_command(name) {
                Some(t) => Self::Report(t),
                None => Self::Unknown(name.to_string()),
            },
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> String {
        match self {
            Self::Start => "start".into(),
            Self::Help => "help".into(),
            Self::Backup => "backup".into(),
            Self::Report(t) => format!("{}_report", t),
            Self::Unknown(name) => format!("unknown:{}", name),
            Self::FreeText => "text".into(),
        }
    }
}

pub static COMMAND_HELP: &[(&str, &str)] = &[
    ("start", "Show the command keyboard"),
    ("sales_report", "Monthly sales totals for the last 24 months"),
    ("payments_report", "Monthly payments by payment mode"),
    ("invoices_report", "The 100 most recent invoices"),
    ("estimates_report", "The 100 most recent estimates"),
    ("proposals_report", "The 100 most recent proposals"),
    ("backup", "Create a database backup"),
    ("help", "Show this message"),
];
