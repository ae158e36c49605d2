use clap::Parser;
use roster_etl::config::report_failure;
use roster_etl::utils::{logger, validation::Validate};
use roster_etl::{CsvToJsonConfig, CsvToJsonPipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CsvToJsonConfig::parse();
    logger::init_cli_logger(config.common.verbose, config.common.log_format);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        std::process::exit(report_failure(&e));
    }

    let catalog = match config.common.load_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let pipeline = CsvToJsonPipeline::new(LocalStorage::default(), config, catalog);
    match EtlEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ Successfully converted to: {}", output_path);
            tracing::info!("Next step: upload {} with the bulk upload tool", output_path);
            Ok(())
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}
