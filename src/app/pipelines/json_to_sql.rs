use super::{records_from_json, validate_all};
use crate::core::catalog::ServiceCatalog;
use crate::core::emit::{SqlDialect, SqlEmitter};
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::Result;

/// JSON contractor array to `ON CONFLICT (email) DO NOTHING` inserts.
/// Rows that fail validation are reported and left out.
pub struct JsonToSqlPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) catalog: ServiceCatalog,
}

impl<S: Storage, C: ConfigProvider> JsonToSqlPipeline<S, C> {
    pub fn new(storage: S, config: C, catalog: ServiceCatalog) -> Self {
        Self {
            storage,
            config,
            catalog,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for JsonToSqlPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::debug!("Reading JSON from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        records_from_json(&bytes)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        Ok(validate_all(data, &self.catalog))
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let sql = SqlEmitter::new(SqlDialect::Upsert, self.config.input_path())
            .render(&result.records);
        let output_path = self.config.output_path();
        self.storage.write_file(output_path, sql.as_bytes()).await?;
        Ok(output_path.to_string())
    }
}
