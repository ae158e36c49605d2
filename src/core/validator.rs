//! Row validation: required fields, service parsing, and assembly of the
//! normalized `ContractorRecord`.

use crate::core::catalog::ServiceCatalog;
use crate::core::normalizer::{clean_optional, normalize_email, normalize_postal_code};
use crate::domain::model::{ContractorRecord, Record};
use crate::domain::report::RowIssue;

/// Required columns, in the order their absence is reported.
const REQUIRED_FIELDS: [&str; 3] = ["company_name", "email", "postal_code"];

/// Outcome of validating one row. Warnings are reported whether or not the
/// row itself was accepted.
#[derive(Debug)]
pub struct RowOutcome {
    pub result: std::result::Result<ContractorRecord, Vec<RowIssue>>,
    pub warnings: Vec<RowIssue>,
}

/// Splits a raw services cell into catalog members and unknown tokens.
///
/// The cell is split on `,` when it contains one, otherwise on `|`,
/// otherwise taken as a single name. Empty tokens are ignored.
pub fn parse_services(raw: &str, catalog: &ServiceCatalog) -> (Vec<String>, Vec<String>) {
    let tokens: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else if raw.contains('|') {
        raw.split('|').collect()
    } else {
        vec![raw]
    };

    partition_services(tokens, catalog)
}

fn partition_services<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
    catalog: &ServiceCatalog,
) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for token in tokens.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
        if catalog.contains(token) {
            valid.push(token.to_string());
        } else {
            invalid.push(token.to_string());
        }
    }
    (valid, invalid)
}

/// Services may arrive as a delimited string (CSV) or as a JSON array.
fn services_of(record: &Record, catalog: &ServiceCatalog) -> (Vec<String>, Vec<String>) {
    match record.data.get("services") {
        Some(serde_json::Value::Array(items)) => {
            let (valid, mut invalid) =
                partition_services(items.iter().filter_map(|v| v.as_str()), catalog);
            // Non-string entries can never match; report them by their JSON text.
            invalid.extend(
                items
                    .iter()
                    .filter(|v| !v.is_string() && !v.is_null())
                    .map(|v| v.to_string()),
            );
            (valid, invalid)
        }
        Some(serde_json::Value::String(raw)) => parse_services(raw, catalog),
        _ => (Vec::new(), Vec::new()),
    }
}

pub fn validate_row(record: &Record, catalog: &ServiceCatalog) -> RowOutcome {
    let line = record.line;
    let mut errors: Vec<RowIssue> = REQUIRED_FIELDS
        .iter()
        .filter(|field| record.text(field).is_none())
        .map(|field| RowIssue::MissingField { line, field: *field })
        .collect();

    let (services, invalid) = services_of(record, catalog);
    let warnings: Vec<RowIssue> = invalid
        .into_iter()
        .map(|service| RowIssue::InvalidService { line, service })
        .collect();

    if services.is_empty() {
        errors.push(RowIssue::NoValidServices { line });
    }

    if !errors.is_empty() {
        return RowOutcome {
            result: Err(errors),
            warnings,
        };
    }

    let field = |key: &str| record.text(key).unwrap_or_default();
    let optional = |key: &str| record.text(key).as_deref().and_then(clean_optional);

    let mut contractor = ContractorRecord::new(
        normalize_email(&field("email")),
        field("company_name"),
        normalize_postal_code(&field("postal_code")),
        services,
    );
    contractor.source_line = line;
    contractor.first_name = optional("first_name");
    contractor.last_name = optional("last_name");
    contractor.phone_number = optional("phone_number");
    contractor.city = optional("city");
    contractor.region = optional("region").or_else(|| optional("province"));
    contractor.business_address = optional("business_address");
    contractor.company_size = optional("company_size");
    contractor.website = optional("website");

    RowOutcome {
        result: Ok(contractor),
        warnings,
    }
}
