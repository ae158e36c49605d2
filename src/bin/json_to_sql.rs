use clap::Parser;
use roster_etl::config::report_failure;
use roster_etl::utils::{logger, validation::Validate};
use roster_etl::{EtlEngine, JsonToSqlConfig, JsonToSqlPipeline, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = JsonToSqlConfig::parse();
    logger::init_cli_logger(config.common.verbose, config.common.log_format);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        std::process::exit(report_failure(&e));
    }

    let catalog = match config.common.load_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let pipeline = JsonToSqlPipeline::new(LocalStorage::default(), config, catalog);
    match EtlEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ SQL written to: {}", output_path);
            Ok(())
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}
