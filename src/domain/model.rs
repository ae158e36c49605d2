use crate::domain::report::RunReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Search radius assigned to every imported contractor, in kilometres.
pub const DEFAULT_RADIUS_KM: u32 = 50;

/// One source row before validation: its 1-based line (or array position)
/// and the raw column values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub line: usize,
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            data: HashMap::new(),
        }
    }

    /// Builder-style insert, mostly for tests and the CSV reader.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Returns the trimmed text of a column, or `None` when the column is
    /// absent, null, or blank. Numbers and booleans are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        let raw = match self.data.get(key)? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if raw.is_empty() {
            None
        } else {
            Some(raw)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A validated, normalized contractor ready for emission.
///
/// Field order is the JSON output order. Optional fields are omitted from
/// JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorRecord {
    pub email: String,
    pub company_name: String,
    pub postal_code: String,
    pub services: Vec<String>,
    pub radius: u32,
    pub is_temp_account: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip)]
    pub source_line: usize,
    #[serde(skip)]
    pub location: Option<Coordinates>,
}

impl ContractorRecord {
    pub fn new(
        email: String,
        company_name: String,
        postal_code: String,
        services: Vec<String>,
    ) -> Self {
        Self {
            email,
            company_name,
            postal_code,
            services,
            radius: DEFAULT_RADIUS_KM,
            is_temp_account: true,
            first_name: None,
            last_name: None,
            phone_number: None,
            city: None,
            region: None,
            business_address: None,
            company_size: None,
            website: None,
            source_line: 0,
            location: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub records: Vec<ContractorRecord>,
    pub report: RunReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_trims_and_drops_blank_values() {
        let record = Record::new(2)
            .with("company_name", "  Acme  ")
            .with("city", "   ")
            .with("company_size", 12);

        assert_eq!(record.text("company_name").as_deref(), Some("Acme"));
        assert_eq!(record.text("city"), None);
        assert_eq!(record.text("missing"), None);
        assert_eq!(record.text("company_size").as_deref(), Some("12"));
    }

    #[test]
    fn test_json_shape_omits_absent_optionals() {
        let mut record = ContractorRecord::new(
            "a@b.ca".to_string(),
            "Acme".to_string(),
            "M5V 2T6".to_string(),
            vec!["Plumbing".to_string()],
        );
        record.city = Some("Toronto".to_string());
        record.location = Some(Coordinates {
            latitude: 43.6,
            longitude: -79.4,
        });

        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["radius"], 50);
        assert_eq!(obj["is_temp_account"], true);
        assert_eq!(obj["city"], "Toronto");
        assert!(!obj.contains_key("first_name"));
        assert!(!obj.contains_key("location"));
        assert!(!obj.contains_key("source_line"));
    }
}
