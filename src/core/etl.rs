use crate::core::Pipeline;
use crate::utils::error::Result;
use tracing::info;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs extract, transform and load once, returning where the output went.
    pub async fn run(&self) -> Result<String> {
        info!("Starting conversion...");

        let rows = self.pipeline.extract().await?;
        info!("Extracted {} rows", rows.len());

        let result = self.pipeline.transform(rows).await?;
        let report = &result.report;
        report.log();
        info!(
            rows_read = report.rows_read,
            emitted = result.records.len(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            geocode_misses = report.geocode_misses(),
            "✅ Conversion summary"
        );

        let output = self.pipeline.load(result).await?;
        info!("Output written to: {}", output);

        Ok(output)
    }
}
