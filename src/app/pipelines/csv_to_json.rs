use super::{records_from_csv, validate_all};
use crate::core::catalog::ServiceCatalog;
use crate::core::emit::JsonEmitter;
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::{EtlError, Result};

/// CSV roster to JSON array. All-or-nothing: if any row fails validation,
/// nothing is written.
pub struct CsvToJsonPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) catalog: ServiceCatalog,
}

impl<S: Storage, C: ConfigProvider> CsvToJsonPipeline<S, C> {
    pub fn new(storage: S, config: C, catalog: ServiceCatalog) -> Self {
        Self {
            storage,
            config,
            catalog,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvToJsonPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::debug!("Reading CSV from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        records_from_csv(&bytes)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        Ok(validate_all(data, &self.catalog))
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        if result.report.has_errors() {
            tracing::warn!("⚠️  Fix these errors and try again.");
            return Err(EtlError::RejectedRowsError {
                count: result.report.rejected_rows(),
            });
        }

        let json = JsonEmitter::render(&result.records)?;
        let output_path = self.config.output_path();
        self.storage.write_file(output_path, json.as_bytes()).await?;

        tracing::info!("Total contractors: {}", result.records.len());
        Ok(output_path.to_string())
    }
}
