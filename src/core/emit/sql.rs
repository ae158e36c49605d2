//! SQL script rendering.
//!
//! Values are inlined as literals. Quoting only doubles single quotes, so
//! input must come from a trusted roster.

use crate::domain::model::{ContractorRecord, Coordinates};
use std::fmt::Write;

/// What to do with the coordinate columns of a row that could not be
/// geocoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatePolicy {
    /// Leave `latitude`/`longitude` out of that row's column list.
    #[default]
    Omit,
    /// Keep the columns and write `NULL`.
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// `temp_*` columns of a temporary account, coordinates included.
    TempAccount { missing_coordinates: CoordinatePolicy },
    /// Full user row guarded by `ON CONFLICT (email) DO NOTHING`.
    Upsert,
}

pub fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn sql_string(value: &str) -> String {
    format!("'{}'", escape_sql(value))
}

pub fn sql_optional(value: Option<&str>) -> String {
    value.map_or_else(|| "NULL".to_string(), sql_string)
}

/// `ARRAY['a', 'b']::text[]`; an empty list is `ARRAY[]::text[]`.
pub fn sql_text_array(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| sql_string(v)).collect();
    format!("ARRAY[{}]::text[]", items.join(", "))
}

fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct SqlEmitter {
    dialect: SqlDialect,
    source: String,
}

impl SqlEmitter {
    pub fn new(dialect: SqlDialect, source: &str) -> Self {
        Self {
            dialect,
            source: source.to_string(),
        }
    }

    /// Renders the whole script: header, one transaction, trailing count.
    pub fn render(&self, records: &[ContractorRecord]) -> String {
        let mut out = String::new();
        self.write_header(&mut out);
        out.push_str("BEGIN;\n\n");

        for record in records {
            match self.dialect {
                SqlDialect::TempAccount {
                    missing_coordinates,
                } => write_temp_account(&mut out, record, missing_coordinates),
                SqlDialect::Upsert => write_upsert(&mut out, record),
            }
            out.push('\n');
        }

        out.push_str("COMMIT;\n\n");
        match self.dialect {
            SqlDialect::TempAccount { .. } => {
                let _ = writeln!(
                    out,
                    "-- Summary: {} contractors prepared for insert",
                    records.len()
                );
            }
            SqlDialect::Upsert => {
                let _ = writeln!(out, "-- Total contractors: {}", records.len());
            }
        }
        out
    }

    fn write_header(&self, out: &mut String) {
        let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        out.push_str("-- Bulk insert temp contractors\n");
        let _ = writeln!(out, "-- Generated from: {}", single_line(&self.source));
        let _ = writeln!(out, "-- Generated at: {}", generated);
        if let SqlDialect::TempAccount { .. } = self.dialect {
            out.push_str("-- Coordinates resolved with the OpenCage geocoding API\n");
            out.push_str("-- Using temp_* columns for temp account functionality\n");
        }
        out.push('\n');
    }
}

fn write_temp_account(out: &mut String, record: &ContractorRecord, policy: CoordinatePolicy) {
    let coordinates: Option<Option<Coordinates>> = match (record.location, policy) {
        (Some(c), _) => Some(Some(c)),
        (None, CoordinatePolicy::Null) => Some(None),
        (None, CoordinatePolicy::Omit) => None,
    };

    let _ = writeln!(
        out,
        "-- Row {}: {}",
        record.source_line,
        single_line(&record.company_name)
    );
    out.push_str("INSERT INTO users (\n");
    if coordinates.is_some() {
        out.push_str("    temp_email, temp_company_name, temp_postal_code, temp_services, role, radius_km, latitude, longitude, is_temp_account, temp_account_created_at\n");
    } else {
        out.push_str("    temp_email, temp_company_name, temp_postal_code, temp_services, role, radius_km, is_temp_account, temp_account_created_at\n");
    }
    out.push_str(") VALUES (\n");
    let _ = writeln!(out, "    {},", sql_string(&record.email));
    let _ = writeln!(out, "    {},", sql_string(&record.company_name));
    let _ = writeln!(out, "    {},", sql_string(&record.postal_code));
    let _ = writeln!(out, "    {},", sql_text_array(&record.services));
    out.push_str("    'contractor',\n");
    let _ = writeln!(out, "    {},", record.radius);
    match coordinates {
        Some(Some(c)) => {
            let _ = writeln!(out, "    {},", c.latitude);
            let _ = writeln!(out, "    {},", c.longitude);
        }
        Some(None) => out.push_str("    NULL,\n    NULL,\n"),
        None => {}
    }
    out.push_str("    TRUE,\n");
    out.push_str("    NOW()\n");
    out.push_str(");\n");
}

fn write_upsert(out: &mut String, record: &ContractorRecord) {
    let values = [
        sql_string(&record.email),
        "'contractor'".to_string(),
        sql_optional(record.first_name.as_deref()),
        sql_optional(record.last_name.as_deref()),
        sql_string(&record.company_name),
        sql_optional(record.phone_number.as_deref()),
        sql_optional(record.business_address.as_deref()),
        sql_optional(record.city.as_deref()),
        sql_optional(record.region.as_deref()),
        sql_string(&record.postal_code),
        sql_text_array(&record.services),
        record.radius.to_string(),
        sql_optional(record.company_size.as_deref()),
        sql_optional(record.website.as_deref()),
        "TRUE".to_string(),
        "FALSE".to_string(),
        "NOW()".to_string(),
        "NOW()".to_string(),
    ];

    out.push_str("INSERT INTO users (\n");
    out.push_str("    email, role, first_name, last_name, company_name, phone_number, business_address, city, region, postal_code, services, radius, company_size, website, is_temp_account, is_verified, created_at, updated_at\n");
    out.push_str(") VALUES (\n");
    out.push_str("    ");
    out.push_str(&values.join(",\n    "));
    out.push_str("\n) ON CONFLICT (email) DO NOTHING;\n");
}
