use clap::Parser;
use roster_etl::config::report_failure;
use roster_etl::core::emit::CoordinatePolicy;
use roster_etl::utils::{logger, validation::Validate};
use roster_etl::{CsvToSqlConfig, CsvToSqlPipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CsvToSqlConfig::parse();
    logger::init_cli_logger(config.common.verbose, config.common.log_format);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        std::process::exit(report_failure(&e));
    }

    // The key is checked before the roster is opened.
    let settings = match config.geocoder_settings() {
        Ok(settings) => settings,
        Err(e) => std::process::exit(report_failure(&e)),
    };
    tracing::debug!("Geocoder settings: {:?}", settings);

    let resolver = match settings.build_resolver() {
        Ok(resolver) => resolver,
        Err(e) => std::process::exit(report_failure(&e)),
    };
    let catalog = match config.common.load_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let policy = if config.null_coordinates {
        CoordinatePolicy::Null
    } else {
        CoordinatePolicy::Omit
    };
    let pipeline = CsvToSqlPipeline::new(LocalStorage::default(), config, catalog, resolver)
        .with_missing_coordinates(policy);

    match EtlEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ SQL written to: {}", output_path);
            Ok(())
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}
