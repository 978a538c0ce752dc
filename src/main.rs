use clap::Parser;
use std::path::Path;
use warehouse_etl::domain::model::Dataset;
use warehouse_etl::domain::ports::DatasetProducer;
use warehouse_etl::utils::{logger, validation::Validate};
use warehouse_etl::{
    CliConfig, EtlEngine, LocalStorage, NoopWarehouse, SampleProducer, ScriptProducer,
    WarehousePipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting warehouse-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!(event = "invalid_config", error = %e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let producers: Vec<Box<dyn DatasetProducer>> = if config.scripts.is_empty() {
        Dataset::ALL
            .iter()
            .map(|dataset| {
                let path = Path::new(&config.data_path).join(dataset.file_name());
                Box::new(SampleProducer::new(*dataset, path, config.sample_rows))
                    as Box<dyn DatasetProducer>
            })
            .collect()
    } else {
        config
            .scripts
            .iter()
            .map(|script| {
                Box::new(ScriptProducer::new(&config.interpreter, script))
                    as Box<dyn DatasetProducer>
            })
            .collect()
    };

    let storage = LocalStorage::new(config.data_path.clone());
    let report_path = config.report_path.clone();
    let pipeline = WarehousePipeline::new(storage, config, NoopWarehouse, producers);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            println!("✅ Pipeline completed successfully!");
            println!("📁 Report saved to: {}", report_path);
            println!(
                "📊 Rows loaded: sales={} financial={} attendance={}",
                report.sales.rows_loaded,
                report.financial.rows_loaded,
                report.attendance.rows_loaded
            );
        }
        Err(e) => {
            tracing::error!(event = "pipeline_failed", error = %e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
