pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::app::pipelines::{CsvToJsonPipeline, CsvToSqlPipeline, JsonToSqlPipeline};
pub use crate::config::{
    CsvToJsonConfig, CsvToSqlConfig, GeocoderSettings, JsonToSqlConfig, LocalStorage,
};
pub use crate::core::catalog::ServiceCatalog;
pub use crate::core::etl::EtlEngine;
pub use crate::utils::error::{EtlError, Result};
