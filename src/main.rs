use clap::Parser;
use parcel_etl::config::toml_config::ServiceConfig;
use parcel_etl::config::Command;
use parcel_etl::utils::{logger, validation::Validate};
use parcel_etl::{CliConfig, CrossRefPipeline, DetailPipeline, EtlEngine, ExportPipeline, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting parcel-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let service = match &config.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };

    let storage = LocalStorage::new(config.output_path.clone());

    let result = match config.command.clone() {
        Command::Export { output_file } => {
            let pipeline = ExportPipeline::new(storage, config, service, output_file);
            EtlEngine::new(pipeline).run().await
        }
        Command::Crossref {
            result_count,
            scrape_details,
            output_file,
        } => {
            let pipeline = CrossRefPipeline::new(
                storage,
                config,
                service,
                result_count,
                scrape_details,
                output_file,
            );
            EtlEngine::new(pipeline).run().await
        }
        Command::Detail {
            schedule,
            output_file,
        } => {
            let pipeline = DetailPipeline::new(storage, service, schedule, output_file);
            EtlEngine::new(pipeline).run().await
        }
    };

    match result {
        Ok(outcome) => {
            println!("✅ {}", outcome);
        }
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
