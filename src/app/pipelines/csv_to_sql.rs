use super::{records_from_csv, validate_all};
use crate::core::catalog::ServiceCatalog;
use crate::core::emit::{CoordinatePolicy, SqlDialect, SqlEmitter};
use crate::core::geocode::GeocodeResolver;
use crate::core::{ConfigProvider, Geocoder, Pipeline, Record, Storage, TransformResult};
use crate::domain::report::RowIssue;
use crate::utils::error::Result;

/// CSV roster to temp-account inserts, each row geocoded by postal code.
///
/// Rows that fail validation are skipped; rows that cannot be geocoded are
/// still emitted and reported as warnings.
pub struct CsvToSqlPipeline<S: Storage, C: ConfigProvider, G: Geocoder> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) catalog: ServiceCatalog,
    pub(crate) resolver: GeocodeResolver<G>,
    pub(crate) missing_coordinates: CoordinatePolicy,
}

impl<S: Storage, C: ConfigProvider, G: Geocoder> CsvToSqlPipeline<S, C, G> {
    pub fn new(
        storage: S,
        config: C,
        catalog: ServiceCatalog,
        resolver: GeocodeResolver<G>,
    ) -> Self {
        Self {
            storage,
            config,
            catalog,
            resolver,
            missing_coordinates: CoordinatePolicy::default(),
        }
    }

    pub fn with_missing_coordinates(mut self, policy: CoordinatePolicy) -> Self {
        self.missing_coordinates = policy;
        self
    }

    pub fn resolver(&self) -> &GeocodeResolver<G> {
        &self.resolver
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, G: Geocoder> Pipeline for CsvToSqlPipeline<S, C, G> {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::info!("Reading CSV from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        records_from_csv(&bytes)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let mut result = validate_all(data, &self.catalog);

        for record in &mut result.records {
            record.location = self.resolver.resolve(&record.postal_code).await.coordinates();
            if record.location.is_none() {
                result.report.push(RowIssue::GeocodeNotFound {
                    line: record.source_line,
                    postal_code: record.postal_code.clone(),
                });
            }
        }

        tracing::debug!(
            "Geocoding finished with {} remote calls",
            self.resolver.remote_calls()
        );
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let dialect = SqlDialect::TempAccount {
            missing_coordinates: self.missing_coordinates,
        };
        let sql = SqlEmitter::new(dialect, self.config.input_path()).render(&result.records);

        let output_path = self.config.output_path();
        self.storage.write_file(output_path, sql.as_bytes()).await?;

        if result.report.geocode_misses() > 0 {
            tracing::warn!(
                "⚠️  {} contractors could not be geocoded",
                result.report.geocode_misses()
            );
        }
        if result.report.has_errors() {
            tracing::warn!(
                "⚠️  {} rows skipped due to validation errors",
                result.report.rejected_rows()
            );
        }
        Ok(output_path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::test_support::{MockStorage, TestConfig};
    use crate::core::etl::EtlEngine;
    use crate::core::geocode::RetryPolicy;
    use crate::domain::model::Coordinates;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct TableGeocoder {
        table: HashMap<String, Coordinates>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Geocoder for TableGeocoder {
        async fn lookup(&self, query: &str) -> Result<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.table.get(query).copied())
        }
    }

    const CSV: &str = "company_name,email,postal_code,services\n\
                       Acme,a@acme.ca,m5v2t6,Plumbing\n\
                       Beta,b@beta.ca,M5V 2T6,\"Fencing, FooBar\"\n\
                       Gamma,g@gamma.ca,X0X0X0,Lawncare\n\
                       Broken,,X0X0X0,Lawncare\n";

    fn geocoder() -> TableGeocoder {
        let mut geocoder = TableGeocoder::default();
        geocoder.table.insert(
            "M5V 2T6, Canada".to_string(),
            Coordinates {
                latitude: 43.6426,
                longitude: -79.3871,
            },
        );
        geocoder
    }

    async fn run(
        policy: CoordinatePolicy,
        geocoder: TableGeocoder,
    ) -> (MockStorage, TransformResult) {
        let storage = MockStorage::with_file("roster.csv", CSV).await;
        let pipeline = CsvToSqlPipeline::new(
            storage.clone(),
            TestConfig::new("roster.csv", "roster.sql"),
            ServiceCatalog::builtin(),
            GeocodeResolver::new(geocoder, RetryPolicy::immediate(3)),
        )
        .with_missing_coordinates(policy);

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        pipeline.load(result.clone()).await.unwrap();
        (storage, result)
    }

    #[tokio::test]
    async fn test_shared_postal_code_is_geocoded_once() {
        let geocoder = geocoder();
        let calls = geocoder.calls.clone();
        let (_, result) = run(CoordinatePolicy::Omit, geocoder).await;

        // M5V 2T6 twice, X0X 0X0 once.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(result.records[0].location.is_some());
        assert_eq!(result.records[0].location, result.records[1].location);
        assert!(result.records[2].location.is_none());
    }

    #[tokio::test]
    async fn test_report_collects_every_issue() {
        let (_, result) = run(CoordinatePolicy::Omit, geocoder()).await;
        let report = &result.report;

        assert_eq!(report.rows_read, 4);
        assert_eq!(
            report.errors,
            vec![RowIssue::MissingField {
                line: 5,
                field: "email"
            }]
        );
        assert!(report.warnings.contains(&RowIssue::InvalidService {
            line: 3,
            service: "FooBar".to_string()
        }));
        assert!(report.warnings.contains(&RowIssue::GeocodeNotFound {
            line: 4,
            postal_code: "X0X 0X0".to_string()
        }));
    }

    #[tokio::test]
    async fn test_ungeocoded_row_is_emitted_without_coordinates() {
        let (storage, _) = run(CoordinatePolicy::Omit, geocoder()).await;
        let sql = storage.get_text("roster.sql").await.unwrap();

        assert_eq!(sql.matches("INSERT INTO users").count(), 3);
        assert_eq!(sql.matches("latitude, longitude").count(), 2);
        assert!(sql.contains("-- Row 4: Gamma"));
        assert!(!sql.contains("NULL"));
        assert!(!sql.contains("Broken"));
        assert!(sql.contains("-- Summary: 3 contractors prepared for insert"));
    }

    #[tokio::test]
    async fn test_null_coordinate_policy() {
        let (storage, _) = run(CoordinatePolicy::Null, geocoder()).await;
        let sql = storage.get_text("roster.sql").await.unwrap();

        assert_eq!(sql.matches("latitude, longitude").count(), 3);
        assert!(sql.contains("    NULL,\n    NULL,\n"));
    }

    #[tokio::test]
    async fn test_engine_run_streams_to_output() {
        let storage = MockStorage::with_file("roster.csv", CSV).await;
        let pipeline = CsvToSqlPipeline::new(
            storage.clone(),
            TestConfig::new("roster.csv", "-"),
            ServiceCatalog::builtin(),
            GeocodeResolver::new(geocoder(), RetryPolicy::immediate(3)),
        );

        let engine = EtlEngine::new(pipeline);
        let output = engine.run().await.unwrap();
        assert_eq!(output, "-");
        assert_eq!(engine.pipeline().resolver().remote_calls(), 2);
        assert!(storage.get_text("-").await.unwrap().starts_with("-- Bulk insert"));
    }
}
