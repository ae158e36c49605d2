pub mod cli;
pub mod geocoder;

use crate::core::catalog::ServiceCatalog;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_path, Validate};
use clap::{Args, Parser};
use std::path::PathBuf;

pub use cli::{LocalStorage, STDOUT_PATH};
pub use geocoder::GeocoderSettings;

pub const DEFAULT_CSV_INPUT: &str = "~/Desktop/temp-contractors.csv";
pub const DEFAULT_JSON_PATH: &str = "~/Desktop/temp-contractors.json";

/// Expands a leading `~` to `$HOME`. Other paths are returned unchanged.
pub fn expand_home(path: &str) -> std::result::Result<String, String> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return Ok(path.to_string()),
    };
    match std::env::var("HOME") {
        Ok(home) => Ok(format!("{}{}", home.trim_end_matches('/'), rest)),
        Err(_) => Err(format!("cannot expand '{}': HOME is not set", path)),
    }
}

/// Flags every binary shares.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Replace the built-in service catalog (one name per line).
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CommonArgs {
    pub async fn load_catalog(&self) -> Result<ServiceCatalog> {
        match &self.catalog {
            Some(path) => ServiceCatalog::from_file(path).await,
            None => Ok(ServiceCatalog::builtin()),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "csv-to-json")]
#[command(about = "Convert a contractor roster CSV into a JSON array for bulk upload")]
pub struct CsvToJsonConfig {
    #[arg(value_name = "INPUT", default_value = DEFAULT_CSV_INPUT, value_parser = expand_home)]
    pub input: String,

    #[arg(value_name = "OUTPUT", default_value = DEFAULT_JSON_PATH, value_parser = expand_home)]
    pub output: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "csv-to-sql")]
#[command(about = "Convert a contractor roster CSV into geocoded SQL inserts")]
pub struct CsvToSqlConfig {
    #[arg(value_name = "INPUT", default_value = DEFAULT_CSV_INPUT, value_parser = expand_home)]
    pub input: String,

    /// Where to write the SQL script; `-` is stdout.
    #[arg(short, long, default_value = STDOUT_PATH, value_parser = expand_home)]
    pub output: String,

    /// TOML file with a `[geocoder]` table. Defaults to the environment.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write NULL coordinates for rows that could not be geocoded instead
    /// of leaving the columns out.
    #[arg(long)]
    pub null_coordinates: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CsvToSqlConfig {
    /// Fails before any input is read when no usable API key is configured.
    pub fn geocoder_settings(&self) -> Result<GeocoderSettings> {
        let settings = match &self.config {
            Some(path) => GeocoderSettings::from_toml_file(path)?,
            None => GeocoderSettings::from_env()?,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "json-to-sql")]
#[command(about = "Convert a contractor JSON array into idempotent SQL inserts")]
pub struct JsonToSqlConfig {
    #[arg(value_name = "INPUT", default_value = DEFAULT_JSON_PATH, value_parser = expand_home)]
    pub input: String,

    /// Where to write the SQL script; `-` is stdout.
    #[arg(short, long, default_value = STDOUT_PATH, value_parser = expand_home)]
    pub output: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

macro_rules! path_config {
    ($config:ty) => {
        impl ConfigProvider for $config {
            fn input_path(&self) -> &str {
                &self.input
            }

            fn output_path(&self) -> &str {
                &self.output
            }
        }

        impl Validate for $config {
            fn validate(&self) -> Result<()> {
                validate_path("input", &self.input)?;
                validate_path("output", &self.output)?;
                if self.input == self.output {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "output".to_string(),
                        value: self.output.clone(),
                        reason: "Output would overwrite the input file".to_string(),
                    });
                }
                Ok(())
            }
        }
    };
}

path_config!(CsvToJsonConfig);
path_config!(CsvToSqlConfig);
path_config!(JsonToSqlConfig);

/// Logs a run-level failure and returns the process exit code for it.
pub fn report_failure(err: &EtlError) -> i32 {
    tracing::error!(
        "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
        err,
        err.category(),
        err.severity()
    );
    tracing::error!("💡 Suggestion: {}", err.recovery_suggestion());
    eprintln!("❌ {}", err.user_friendly_message());
    err.severity().exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = std::env::var("HOME").unwrap();
        assert_eq!(
            expand_home("~/Desktop/temp-contractors.csv").unwrap(),
            format!("{}/Desktop/temp-contractors.csv", home.trim_end_matches('/'))
        );
        assert_eq!(expand_home("roster.csv").unwrap(), "roster.csv");
        assert_eq!(expand_home("~other/x").unwrap(), "~other/x");
        assert_eq!(expand_home("-").unwrap(), "-");
    }

    #[test]
    fn test_csv_to_json_positional_paths() {
        let config = CsvToJsonConfig::parse_from(["csv-to-json", "in.csv", "out.json"]);
        assert_eq!(config.input_path(), "in.csv");
        assert_eq!(config.output_path(), "out.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_point_at_desktop() {
        let config = CsvToJsonConfig::parse_from(["csv-to-json"]);
        assert!(config.input.ends_with("/Desktop/temp-contractors.csv"));
        assert!(config.output.ends_with("/Desktop/temp-contractors.json"));
        assert!(!config.common.verbose);
        assert_eq!(config.common.log_format, LogFormat::Compact);

        let config = JsonToSqlConfig::parse_from(["json-to-sql"]);
        assert!(config.input.ends_with("/Desktop/temp-contractors.json"));
        assert_eq!(config.output, STDOUT_PATH);
    }

    #[test]
    fn test_csv_to_sql_flags() {
        let config = CsvToSqlConfig::parse_from([
            "csv-to-sql",
            "roster.csv",
            "--output",
            "out.sql",
            "--null-coordinates",
            "--log-format",
            "json",
            "-v",
        ]);
        assert_eq!(config.output_path(), "out.sql");
        assert!(config.null_coordinates);
        assert!(config.common.verbose);
        assert_eq!(config.common.log_format, LogFormat::Json);
    }

    #[test]
    fn test_report_failure_exit_codes() {
        let client_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert_eq!(report_failure(&EtlError::ApiError(client_err)), 2);

        let missing_key = EtlError::MissingConfigError {
            field: "OPENCAGE_API_KEY".to_string(),
        };
        assert_eq!(report_failure(&missing_key), 3);
        assert_eq!(report_failure(&EtlError::RejectedRowsError { count: 1 }), 1);
    }

    #[test]
    fn test_output_must_differ_from_input() {
        let config = CsvToJsonConfig::parse_from(["csv-to-json", "same.csv", "same.csv"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_geocoder_settings_from_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("geocoder.toml");
        std::fs::write(&path, "[geocoder]\napi_key = \"file-key\"\n").unwrap();

        let config = CsvToSqlConfig::parse_from([
            "csv-to-sql".to_string(),
            "--config".to_string(),
            path.display().to_string(),
        ]);
        let settings = config.geocoder_settings().unwrap();
        assert_eq!(settings.api_key, "file-key");
    }
}
