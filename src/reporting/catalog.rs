use std::sync::LazyLock;
use serde::{Deserialize, Serialize};
use crate::errors::CrmBotError;
use crate::models::ReportRow;
use super::enrich;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Sales,
    Payments,
    Invoices,
    Estimates,
    Proposals,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Sales,
        ReportType::Payments,
        ReportType::Invoices,
        ReportType::Estimates,
        ReportType::Proposals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Payments => "payments",
            Self::Invoices => "invoices",
            Self::Estimates => "estimates",
            Self::Proposals => "proposals",
        }
    }

    /// Resolve a command name (`sales` or `sales_report`) to its report type.
    pub fn from_command(name: &str) -> Option<Self> {
        let name = name.strip_suffix("_report").unwrap_or(name);
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn definition(&self) -> &'static ReportDefinition {
        definition(*self)
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportType {
    type Err = CrmBotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_command(&s.to_ascii_lowercase())
            .ok_or_else(|| CrmBotError::Config(format!("Unknown report type: {}", s)))
    }
}

pub type EnrichFn = fn(ReportType, Vec<ReportRow>) -> Result<Vec<ReportRow>, CrmBotError>;

/// One catalog entry: the fixed query, its display title, and the
/// post-query enrichment applied before rendering.
pub struct ReportDefinition {
    pub report_type: ReportType,
    pub title: &'static str,
    pub query: String,
    pub enrich: EnrichFn,
}

pub struct StatusLabel {
    pub code: i64,
    pub label: &'static str,
}

pub const UNKNOWN_STATUS: &str = "Unknown";

pub static INVOICE_STATUSES: &[StatusLabel] = &[
    StatusLabel { code: 1, label: "Unpaid" },
    StatusLabel { code: 2, label: "Paid" },
    StatusLabel { code: 3, label: "Partially Paid" },
    StatusLabel { code: 4, label: "Overdue" },
    StatusLabel { code: 5, label: "Cancelled" },
];

pub static ESTIMATE_STATUSES: &[StatusLabel] = &[
    StatusLabel { code: 1, label: "Draft" },
    StatusLabel { code: 2, label: "Sent" },
    StatusLabel { code: 3, label: "Declined" },
    StatusLabel { code: 4, label: "Accepted" },
    StatusLabel { code: 5, label: "Expired" },
];

pub static PROPOSAL_STATUSES: &[StatusLabel] = &[
    StatusLabel { code: 0, label: "Draft" },
    StatusLabel { code: 1, label: "Open" },
    StatusLabel { code: 2, label: "Declined" },
    StatusLabel { code: 3, label: "Accepted" },
    StatusLabel { code: 4, label: "Sent" },
];

/// Invoice status excluded from the sales aggregate.
const INVOICE_CANCELLED: i64 = 5;

pub fn status_table(report_type: ReportType) -> &'static [StatusLabel] {
    match report_type {
        ReportType::Invoices => INVOICE_STATUSES,
        ReportType::Estimates => ESTIMATE_STATUSES,
        ReportType::Proposals => PROPOSAL_STATUSES,
        ReportType::Sales | ReportType::Payments => &[],
    }
}

/// Map a status code to its label; codes outside the table are "Unknown".
pub fn status_label(report_type: ReportType, code: i64) -> &'static str {
    status_table(report_type)
        .iter()
        .find(|s| s.code == code)
        .map(|s| s.label)
        .unwrap_or(UNKNOWN_STATUS)
}

/// Build the SQL `CASE` expression for a status table so the query and
/// [`status_label`] share one source of truth.
fn status_case(column: &str, table: &[StatusLabel]) -> String {
    let mut sql = String::from("CASE");
    for status in table {
        sql.push_str(&format!(
            "\n            WHEN {} = {} THEN '{}'",
            column,
            status.code,
            status.label.replace('\'', "''")
        ));
    }
    sql.push_str(&format!("\n            ELSE '{}'\n        END", UNKNOWN_STATUS));
    sql
}

fn sales_query() -> String {
    format!(
        "SELECT
        CAST(strftime('%Y', tblinvoices.date) AS INTEGER) AS year,
        CAST(strftime('%m', tblinvoices.date) AS INTEGER) AS month,
        COUNT(*) AS count,
        SUM(tblinvoices.total) AS total
    FROM tblinvoices
    WHERE tblinvoices.status != {}
    GROUP BY year, month
    ORDER BY year DESC, month DESC
    LIMIT 24",
        INVOICE_CANCELLED
    )
}

fn payments_query() -> String {
    "SELECT
        CAST(strftime('%Y', tblinvoicepaymentrecords.date) AS INTEGER) AS year,
        CAST(strftime('%m', tblinvoicepaymentrecords.date) AS INTEGER) AS month,
        COUNT(*) AS count,
        SUM(tblinvoicepaymentrecords.amount) AS total,
        tblpaymentmodes.name AS payment_mode
    FROM tblinvoicepaymentrecords
    LEFT JOIN tblpaymentmodes ON tblpaymentmodes.id = tblinvoicepaymentrecords.paymentmode
    GROUP BY year, month, tblpaymentmodes.name
    ORDER BY year DESC, month DESC
    LIMIT 100"
        .to_string()
}

fn invoices_query() -> String {
    format!(
        "SELECT
        tblinvoices.id,
        tblinvoices.number,
        tblinvoices.date,
        tblinvoices.duedate,
        tblinvoices.total,
        tblinvoices.subtotal,
        tblinvoices.total_tax,
        tblclients.company AS client_name,
        {} AS status_text
    FROM tblinvoices
    LEFT JOIN tblclients ON tblclients.userid = tblinvoices.clientid
    ORDER BY tblinvoices.date DESC, tblinvoices.id DESC
    LIMIT 100",
        status_case("tblinvoices.status", INVOICE_STATUSES)
    )
}

fn estimates_query() -> String {
    format!(
        "SELECT
        tblestimates.id,
        tblestimates.number,
        tblestimates.date,
        tblestimates.expirydate,
        tblestimates.total,
        tblestimates.subtotal,
        tblestimates.total_tax,
        tblclients.company AS client_name,
        {} AS status_text
    FROM tblestimates
    LEFT JOIN tblclients ON tblclients.userid = tblestimates.clientid
    ORDER BY tblestimates.date DESC, tblestimates.id DESC
    LIMIT 100",
        status_case("tblestimates.status", ESTIMATE_STATUSES)
    )
}

fn proposals_query() -> String {
    format!(
        "SELECT
        tblproposals.id,
        tblproposals.subject,
        tblproposals.datecreated,
        tblproposals.open_till,
        tblproposals.total,
        tblproposals.subtotal,
        tblproposals.total_tax,
        tblclients.company AS client_name,
        {} AS status_text
    FROM tblproposals
    LEFT JOIN tblclients ON tblclients.userid = tblproposals.rel_id AND tblproposals.rel_type = 'customer'
    ORDER BY tblproposals.datecreated DESC, tblproposals.id DESC
    LIMIT 100",
        status_case("tblproposals.status", PROPOSAL_STATUSES)
    )
}

pub static REPORT_CATALOG: LazyLock<Vec<ReportDefinition>> = LazyLock::new(|| vec![
    ReportDefinition {
        report_type: ReportType::Sales,
        title: "Sales Report",
        query: sales_query(),
        enrich: enrich::add_period_labels,
    },
    ReportDefinition {
        report_type: ReportType::Payments,
        title: "Payments Report",
        query: payments_query(),
        enrich: enrich::add_period_labels,
    },
    ReportDefinition {
        report_type: ReportType::Invoices,
        title: "Invoices Report",
        query: invoices_query(),
        enrich: enrich::identity,
    },
    ReportDefinition {
        report_type: ReportType::Estimates,
        title: "Estimates Report",
        query: estimates_query(),
        enrich: enrich::identity,
    },
    ReportDefinition {
        report_type: ReportType::Proposals,
        title: "Proposals Report",
        query: proposals_query(),
        enrich: enrich::identity,
    },
]);

pub fn definition(report_type: ReportType) -> &'static ReportDefinition {
    // The catalog holds exactly one entry per ReportType variant, in ALL order.
    let idx = ReportType::ALL
        .iter()
        .position(|t| *t == report_type)
        .unwrap_or_default();
    &REPORT_CATALOG[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_report_type() {
        assert_eq!(REPORT_CATALOG.len(), ReportType::ALL.len());
        for t in ReportType::ALL {
            assert_eq!(definition(t).report_type, t);
        }
    }

    #[test]
    fn test_from_command_accepts_both_spellings() {
        assert_eq!(ReportType::from_command("sales"), Some(ReportType::Sales));
        assert_eq!(ReportType::from_command("sales_report"), Some(ReportType::Sales));
        assert_eq!(ReportType::from_command("proposals_report"), Some(ReportType::Proposals));
        assert_eq!(ReportType::from_command("backup"), None);
        assert_eq!(ReportType::from_command("_report"), None);
    }

    #[test]
    fn test_report_type_from_str_is_case_insensitive() {
        assert_eq!("Invoices".parse::<ReportType>().unwrap(), ReportType::Invoices);
        assert!("ledger".parse::<ReportType>().is_err());
    }

    #[test]
    fn test_invoice_status_mapping_is_total() {
        let expected = ["Unpaid", "Paid", "Partially Paid", "Overdue", "Cancelled"];
        for (code, label) in (1..=5).zip(expected) {
            assert_eq!(status_label(ReportType::Invoices, code), label);
        }
        for code in [-1, 0, 6, 99] {
            assert_eq!(status_label(ReportType::Invoices, code), "Unknown");
        }
    }

    #[test]
    fn test_proposal_statuses_start_at_zero() {
        assert_eq!(status_label(ReportType::Proposals, 0), "Draft");
        assert_eq!(status_label(ReportType::Proposals, 4), "Sent");
        assert_eq!(status_label(ReportType::Proposals, 5), "Unknown");
    }

    #[test]
    fn test_estimate_statuses() {
        assert_eq!(status_label(ReportType::Estimates, 4), "Accepted");
        assert_eq!(status_label(ReportType::Estimates, 0), "Unknown");
    }

    #[test]
    fn test_aggregate_reports_have_no_status_table() {
        assert!(status_table(ReportType::Sales).is_empty());
        assert_eq!(status_label(ReportType::Payments, 1), "Unknown");
    }

    #[test]
    fn test_status_case_lists_every_code() {
        let sql = status_case("t.status", INVOICE_STATUSES);
        assert!(sql.starts_with("CASE"));
        assert!(sql.contains("WHEN t.status = 3 THEN 'Partially Paid'"));
        assert!(sql.contains("ELSE 'Unknown'"));
        assert!(sql.trim_end().ends_with("END"));
    }

    #[test]
    fn test_queries_are_limited_and_newest_first() {
        assert!(definition(ReportType::Sales).query.contains("LIMIT 24"));
        for t in [ReportType::Payments, ReportType::Invoices, ReportType::Estimates, ReportType::Proposals] {
            let q = &definition(t).query;
            assert!(q.contains("LIMIT 100"), "{} query missing limit", t);
            assert!(q.contains("DESC"), "{} query not newest first", t);
        }
    }

    #[test]
    fn test_proposals_join_only_customers() {
        assert!(definition(ReportType::Proposals).query.contains("rel_type = 'customer'"));
    }

    #[test]
    fn test_titles() {
        assert_eq!(ReportType::Sales.definition().title, "Sales Report");
        assert_eq!(ReportType::Estimates.definition().title, "Estimates Report");
    }
}
