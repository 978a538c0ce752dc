use std::fs;
use tempfile::TempDir;
use warehouse_etl::domain::model::{Dataset, PipelineReport};
use warehouse_etl::domain::ports::DatasetProducer;
use warehouse_etl::{
    CliConfig, EtlEngine, LocalStorage, NoopWarehouse, SampleProducer, WarehousePipeline,
};

fn config_for(dir: &TempDir, sample_rows: usize) -> CliConfig {
    CliConfig {
        project: "demo_project".to_string(),
        dataset: "demo_dataset".to_string(),
        location: "US".to_string(),
        dry_run: false,
        data_path: dir.path().to_str().unwrap().to_string(),
        fx_rates: "data/fx_rates.csv".to_string(),
        ddl_path: "ddl".to_string(),
        report_path: "reports/summary.json".to_string(),
        scripts: vec![],
        interpreter: "python3".to_string(),
        sample_rows,
        verbose: false,
    }
}

fn seed_reference_files(dir: &TempDir) {
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("fx_rates.csv"),
        "currency_code,rate_to_usd\nUSD,1.0\nEUR,1.09\nJPY,0.0067\nGBP,1.27\nCAD,0.73\nINR,0.012\n",
    )
    .unwrap();

    let ddl_dir = dir.path().join("ddl");
    fs::create_dir_all(&ddl_dir).unwrap();
    fs::write(
        ddl_dir.join("01_dataset.sql"),
        "CREATE SCHEMA IF NOT EXISTS `${project}.${dataset}` OPTIONS (location = \"${location}\");\n",
    )
    .unwrap();
    fs::write(
        ddl_dir.join("02_tables.sql"),
        "CREATE TABLE IF NOT EXISTS `${project}.${dataset}.sales` (SaleID STRING);\n",
    )
    .unwrap();
    fs::write(
        ddl_dir.join("03_merges.sql"),
        "MERGE `${project}.${dataset}.sales` T USING `${project}.${dataset}.stg_sales` S ON T.SaleID = S.SaleID WHEN NOT MATCHED THEN INSERT ROW;\n",
    )
    .unwrap();
}

fn sample_producers(dir: &TempDir, rows: usize) -> Vec<Box<dyn DatasetProducer>> {
    Dataset::ALL
        .iter()
        .map(|dataset| {
            let path = dir.path().join(dataset.file_name());
            Box::new(SampleProducer::new(*dataset, path, rows)) as Box<dyn DatasetProducer>
        })
        .collect()
}

#[tokio::test]
async fn test_end_to_end_run_with_sample_producers() {
    let dir = TempDir::new().unwrap();
    seed_reference_files(&dir);

    let rows = 26;
    let config = config_for(&dir, rows);
    let storage = LocalStorage::new(config.data_path.clone());
    let producers = sample_producers(&dir, rows);
    let pipeline = WarehousePipeline::new(storage, config, NoopWarehouse, producers);
    let engine = EtlEngine::new(pipeline);

    let report = engine.run().await.unwrap();

    // The producers materialized all three input files.
    for dataset in Dataset::ALL {
        assert!(dir.path().join(dataset.file_name()).exists());
    }

    // No row is silently dropped or double-counted.
    for dataset_report in [&report.sales, &report.financial, &report.attendance] {
        assert_eq!(dataset_report.rows_read, rows);
        assert_eq!(
            dataset_report.rows_loaded + dataset_report.rows_rejected,
            dataset_report.rows_read
        );
    }
    // The sample data sprinkles rejectable rows into every dataset.
    assert!(report.sales.rows_rejected > 0);
    assert!(report.financial.rows_rejected > 0);
    assert!(report.attendance.rows_rejected > 0);

    // The persisted artifact matches the returned report and omits the USD
    // bounds for attendance only.
    let report_path = dir.path().join("reports/summary.json");
    let raw = fs::read_to_string(&report_path).unwrap();
    let persisted: PipelineReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.sales.rows_loaded, report.sales.rows_loaded);

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value["sales"].get("usd_min").is_some());
    assert!(value["financial"].get("usd_min").is_some());
    assert!(value["attendance"].get("usd_min").is_none());
    assert!(value["sales"]["usd_min"].as_f64().unwrap() <= value["sales"]["usd_max"].as_f64().unwrap());
}

#[tokio::test]
async fn test_rerun_cleans_up_previous_outputs() {
    let dir = TempDir::new().unwrap();
    seed_reference_files(&dir);

    // A stale file from a "previous run" with unreadable content.
    fs::write(dir.path().join(Dataset::Sales.file_name()), "stale garbage").unwrap();

    let rows = 8;
    let config = config_for(&dir, rows);
    let storage = LocalStorage::new(config.data_path.clone());
    let producers = sample_producers(&dir, rows);
    let pipeline = WarehousePipeline::new(storage, config, NoopWarehouse, producers);

    let report = EtlEngine::new(pipeline).run().await.unwrap();
    assert_eq!(report.sales.rows_read, rows);
}

#[tokio::test]
async fn test_missing_fx_rates_fails_the_run() {
    let dir = TempDir::new().unwrap();
    seed_reference_files(&dir);
    fs::remove_file(dir.path().join("data/fx_rates.csv")).unwrap();

    let config = config_for(&dir, 8);
    let storage = LocalStorage::new(config.data_path.clone());
    let producers = sample_producers(&dir, 8);
    let pipeline = WarehousePipeline::new(storage, config, NoopWarehouse, producers);

    let err = EtlEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(
        err,
        warehouse_etl::EtlError::DataUnavailable { .. }
    ));
}
