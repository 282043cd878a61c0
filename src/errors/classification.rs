use super::types::CrmBotError;
use crate::dispatch::messages;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub user_message: String,
}

impl CrmBotError {
    /// Classify this error into a log label and the text shown to the chat user.
    ///
    /// The user message never includes the underlying cause; that stays in
    /// the server-side log.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            CrmBotError::Authorization(_) => ErrorClassification {
                error_type: "AuthorizationError",
                user_message: messages::UNAUTHORIZED.to_string(),
            },
            CrmBotError::ReportGeneration { report_type, .. } => ErrorClassification {
                error_type: "ReportGenerationError",
                user_message: messages::report_failure(*report_type),
            },
            CrmBotError::Render { report_type, .. } => ErrorClassification {
                error_type: "RenderError",
                user_message: messages::report_failure(*report_type),
            },
            CrmBotError::Backup(_) => ErrorClassification {
                error_type: "BackupError",
                user_message: messages::BACKUP_FAILURE.to_string(),
            },
            CrmBotError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
            CrmBotError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
            CrmBotError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
            CrmBotError::Io(_) => ErrorClassification {
                error_type: "IoError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
            CrmBotError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
            CrmBotError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
            CrmBotError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                user_message: messages::GENERIC_FAILURE.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::catalog::ReportType;

    #[test]
    fn test_report_generation_hides_cause() {
        let err = CrmBotError::report_generation(ReportType::Sales, "no such table: tblinvoices");
        let class = err.classify();
        assert_eq!(class.error_type, "ReportGenerationError");
        assert_eq!(class.user_message, "An error occurred while generating the sales report.");
        assert!(!class.user_message.contains("tblinvoices"));
    }

    #[test]
    fn test_render_error_uses_report_failure_text() {
        let err = CrmBotError::render(ReportType::Proposals, "xlsx buffer error");
        let class = err.classify();
        assert_eq!(class.error_type, "RenderError");
        assert_eq!(class.user_message, "An error occurred while generating the proposals report.");
    }

    #[test]
    fn test_backup_error_classification() {
        let err = CrmBotError::Backup("mysqldump exited with status 2".into());
        let class = err.classify();
        assert_eq!(class.error_type, "BackupError");
        assert_eq!(class.user_message, "An error occurred while creating the backup.");
    }

    #[test]
    fn test_authorization_classification() {
        let class = CrmBotError::Authorization(42).classify();
        assert_eq!(class.error_type, "AuthorizationError");
        assert_eq!(class.user_message, "You are not authorized to use this bot.");
    }

    #[test]
    fn test_internal_errors_get_generic_text() {
        let class = CrmBotError::Database("disk I/O error".into()).classify();
        assert_eq!(class.error_type, "DatabaseError");
        assert!(!class.user_message.contains("disk"));
    }
}
