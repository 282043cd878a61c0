use crate::reporting::ReportType;
use super::commands::COMMAND_HELP;

pub const UNAUTHORIZED: &str = "You are not authorized to use this bot.";
pub const WELCOME: &str = "Welcome to Perfex CRM Bot! Please select an option:";
pub const FALLBACK: &str = "Please use the commands from the keyboard or type /help for available commands.";
pub const BACKUP_SUCCESS: &str = "Database backup created successfully!";
pub const BACKUP_FAILURE: &str = "An error occurred while creating the backup.";
pub const GENERIC_FAILURE: &str = "An error occurred while processing your request.";

/// Reply keyboard offered with the welcome text.
pub const KEYBOARD: [[&str; 2]; 3] = [
    ["/sales_report", "/payments_report"],
    ["/invoices_report", "/estimates_report"],
    ["/proposals_report", "/backup"],
];

pub fn keyboard() -> Vec<Vec<String>> {
    KEYBOARD
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

pub fn report_success(report_type: ReportType) -> String {
    format!("{} report generated successfully!", capitalize(report_type.as_str()))
}

pub fn report_failure(report_type: ReportType) -> String {
    format!("An error occurred while generating the {} report.", report_type)
}

pub fn help_text() -> String {
    let mut text = String::from("Available commands:\n");
    for (command, description) in COMMAND_HELP {
        text.push_str(&format!("/{} - {}\n", command, description));
    }
    text.trim_end().to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
