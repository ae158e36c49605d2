//! The three roster conversions, plus the extraction and validation steps
//! they share.

pub mod csv_to_json;
pub mod csv_to_sql;
pub mod json_to_sql;

pub use csv_to_json::CsvToJsonPipeline;
pub use csv_to_sql::CsvToSqlPipeline;
pub use json_to_sql::JsonToSqlPipeline;

use crate::core::catalog::ServiceCatalog;
use crate::core::validator::validate_row;
use crate::core::{Record, TransformResult};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, Trim};

const BOM: char = '\u{feff}';

/// Reads CSV rows keyed by header name. Each record carries the line it
/// starts on, so the first data row after the header is line 2.
pub(crate) fn records_from_csv(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();
    tracing::debug!("CSV columns: {:?}", headers);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(records.len() + 2, |p| p.line() as usize);
        let mut record = Record::new(line);
        for (header, value) in headers.iter().zip(row.iter()) {
            if !header.is_empty() {
                record
                    .data
                    .insert(header.clone(), serde_json::Value::String(value.to_string()));
            }
        }
        records.push(record);
    }

    Ok(records)
}

/// Reads a JSON array of objects. Rows are numbered by array position,
/// starting at 1.
pub(crate) fn records_from_json(bytes: &[u8]) -> Result<Vec<Record>> {
    let document: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(items) = document else {
        return Err(EtlError::InputFormatError {
            message: "expected a JSON array of contractor objects".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(obj) => Ok(Record {
                line: index + 1,
                data: obj.into_iter().collect(),
            }),
            other => Err(EtlError::InputFormatError {
                message: format!(
                    "element {} is {}, expected an object",
                    index + 1,
                    json_kind(&other)
                ),
            }),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Validates every row in order. Rejected rows are reported and skipped.
pub(crate) fn validate_all(rows: Vec<Record>, catalog: &ServiceCatalog) -> TransformResult {
    let mut result = TransformResult::default();
    result.report.rows_read = rows.len();

    for row in &rows {
        let outcome = validate_row(row, catalog);
        result.report.extend(outcome.warnings);
        match outcome.result {
            Ok(contractor) => result.records.push(contractor),
            Err(errors) => result.report.extend(errors),
        }
    }

    tracing::debug!(
        "Validated {} rows: {} accepted, {} rejected",
        result.report.rows_read,
        result.records.len(),
        result.report.rejected_rows()
    );
    result
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_line_numbers_and_headers() {
        let csv = "\u{feff} company_name ,email,postal_code,services\n\
                   Acme,a@acme.ca,M5V2T6,Plumbing\n\
                   \"Multi\nLine Co\",b@multi.ca,H2X1Y4,Fencing\n\
                   Short,c@short.ca\n";
        let records = records_from_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].text("company_name").as_deref(), Some("Acme"));
        assert_eq!(records[1].line, 3);
        assert_eq!(records[2].line, 5);
        assert_eq!(records[2].text("postal_code"), None);
    }

    #[test]
    fn test_json_rows_are_numbered_from_one() {
        let json = r#"[{"email": "a@b.ca"}, {"email": "c@d.ca"}]"#;
        let records = records_from_json(json.as_bytes()).unwrap();
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].text("email").as_deref(), Some("c@d.ca"));
    }

    #[test]
    fn test_json_must_be_array_of_objects() {
        let err = records_from_json(br#"{"email": "a@b.ca"}"#).unwrap_err();
        assert!(matches!(err, EtlError::InputFormatError { .. }));

        let err = records_from_json(br#"[{"email": "a@b.ca"}, 3]"#).unwrap_err();
        assert!(err.to_string().contains("element 2 is a number"));

        let err = records_from_json(b"not json").unwrap_err();
        assert!(matches!(err, EtlError::SerializationError(_)));
    }

    #[test]
    fn test_validate_all_keeps_order_and_collects_issues() {
        let rows = vec![
            Record::new(2)
                .with("company_name", "A")
                .with("email", "a@a.ca")
                .with("postal_code", "a1a1a1")
                .with("services", "Plumbing, FooBar"),
            Record::new(3).with("company_name", "B"),
            Record::new(4)
                .with("company_name", "C")
                .with("email", "c@c.ca")
                .with("postal_code", "b2b2b2")
                .with("services", "Fencing"),
        ];
        let result = validate_all(rows, &ServiceCatalog::builtin());

        assert_eq!(result.report.rows_read, 3);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].company_name, "A");
        assert_eq!(result.records[1].company_name, "C");
        assert_eq!(result.report.rejected_rows(), 1);
        assert_eq!(result.report.warnings.len(), 1);
    }
}
