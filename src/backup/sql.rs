use crate::models::{CellValue, ReportRow};

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Encode a value as a SQL literal: numbers pass through, text is
/// single-quoted with embedded quotes doubled, blobs use `X'..'`.
pub fn sql_literal(value: &CellValue) -> String {
    match value {
        CellValue::Null => "NULL".to_string(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(f) if f.is_nan() => "NULL".to_string(),
        CellValue::Float(f) if f.is_infinite() => {
            if f.is_sign_positive() { "9.0e+999".to_string() } else { "-9.0e+999".to_string() }
        }
        CellValue::Float(f) => format_float(*f),
        CellValue::Text(s) => quote_text(s),
        CellValue::Date(d) => quote_text(&d.format("%Y-%m-%d").to_string()),
        CellValue::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2 + 3);
            hex.push_str("X'");
            for b in bytes {
                hex.push_str(&format!("{:02X}", b));
            }
            hex.push('\'');
            hex
        }
    }
}

/// `INSERT INTO "table" ("a", "b") VALUES (1, 'x');`
pub fn insert_statement(table: &str, row: &ReportRow) -> String {
    let columns: Vec<String> = row.columns().map(quote_identifier).collect();
    let values: Vec<String> = row.values().map(sql_literal).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_identifier(table),
        columns.join(", "),
        values.join(", ")
    )
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// Keep a decimal point so the value reads back as REAL.
fn format_float(f: f64) -> String {
    let s = f.to_string();
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_literal_numbers_pass_through() {
        assert_eq!(sql_literal(&CellValue::Integer(-42)), "-42");
        assert_eq!(sql_literal(&CellValue::Float(1250.75)), "1250.75");
        assert_eq!(sql_literal(&CellValue::Float(100.0)), "100.0");
    }

    #[test]
    fn test_literal_text_doubles_quotes() {
        assert_eq!(sql_literal(&CellValue::Text("O'Brien & Sons".into())), "'O''Brien & Sons'");
        assert_eq!(sql_literal(&CellValue::Text("''".into())), "''''''");
    }

    #[test]
    fn test_literal_null_and_nan() {
        assert_eq!(sql_literal(&CellValue::Null), "NULL");
        assert_eq!(sql_literal(&CellValue::Float(f64::NAN)), "NULL");
        assert_eq!(sql_literal(&CellValue::Float(f64::NEG_INFINITY)), "-9.0e+999");
    }

    #[test]
    fn test_literal_blob_and_date() {
        assert_eq!(sql_literal(&CellValue::Blob(vec![0x00, 0xab, 0x10])), "X'00AB10'");
        let d = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(sql_literal(&CellValue::Date(d)), "'2023-12-01'");
    }

    #[test]
    fn test_quote_identifier_escapes() {
        assert_eq!(quote_identifier("tblclients"), "\"tblclients\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_insert_statement() {
        let mut row = ReportRow::new();
        row.insert("userid", 7);
        row.insert("company", "Smith's Bakery");
        row.insert("vat", CellValue::Null);
        assert_eq!(
            insert_statement("tblclients", &row),
            "INSERT INTO \"tblclients\" (\"userid\", \"company\", \"vat\") VALUES (7, 'Smith''s Bakery', NULL);"
        );
    }
}
