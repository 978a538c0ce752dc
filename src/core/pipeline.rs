use crate::core::transform::{self, FxRateTable};
use crate::core::validate;
use crate::core::warehouse::{SqlApplier, SqlStage, SqlVars, SQL_STAGES};
use crate::domain::model::{
    Dataset, DatasetReport, DerivedAttendance, DerivedFinancial, DerivedSale, PipelineReport,
    ValidationOutcome,
};
use crate::domain::ports::{ConfigProvider, DatasetProducer, Pipeline, Storage, Warehouse};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;

/// Sequences the whole run: cleanup, producers, FX load, read, convert,
/// validate, guard, stamp, report, preview, warehouse apply. Strictly
/// sequential; any error fails the entire run.
pub struct WarehousePipeline<S: Storage, C: ConfigProvider, W: Warehouse> {
    storage: S,
    config: C,
    applier: SqlApplier<W>,
    producers: Vec<Box<dyn DatasetProducer>>,
}

impl<S: Storage, C: ConfigProvider, W: Warehouse> WarehousePipeline<S, C, W> {
    pub fn new(
        storage: S,
        config: C,
        warehouse: W,
        producers: Vec<Box<dyn DatasetProducer>>,
    ) -> Self {
        let vars = SqlVars {
            project: config.project().to_string(),
            dataset: config.dataset().to_string(),
            location: config.location().to_string(),
        };
        let applier = SqlApplier::new(warehouse, vars, config.dry_run());
        Self {
            storage,
            config,
            applier,
            producers,
        }
    }

    /// Best-effort removal of output files from a previous run. Absence is
    /// not an error.
    async fn cleanup(&self) {
        for dataset in Dataset::ALL {
            match self.storage.remove_file(dataset.file_name()).await {
                Ok(true) => {
                    tracing::info!(
                        event = "cleanup",
                        file = dataset.file_name(),
                        "removed file from previous run"
                    );
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        event = "cleanup_failed",
                        file = dataset.file_name(),
                        error = %e,
                        "could not remove file from previous run"
                    );
                }
            }
        }
    }

    /// Producers run sequentially; the first failure stops the run and the
    /// remaining producers are never started.
    async fn generate(&self) -> Result<()> {
        for producer in &self.producers {
            tracing::info!(event = "script_start", script = producer.name());
            producer.produce().await?;
            tracing::info!(event = "script_complete", script = producer.name());
        }
        Ok(())
    }

    async fn load_fx_rates(&self) -> Result<FxRateTable> {
        let data = self
            .storage
            .read_file(self.config.fx_rates_path())
            .await
            .map_err(|e| EtlError::DataUnavailable {
                message: format!("FX rate file {}: {}", self.config.fx_rates_path(), e),
            })?;
        let fx = FxRateTable::from_csv(&data)?;
        tracing::info!(event = "fx_rates_loaded", currencies = fx.len());
        Ok(fx)
    }

    async fn read_dataset<T: DeserializeOwned>(&self, dataset: Dataset) -> Result<Vec<T>> {
        let data = self
            .storage
            .read_file(dataset.file_name())
            .await
            .map_err(|e| EtlError::DataUnavailable {
                message: format!("{} input {}: {}", dataset, dataset.file_name(), e),
            })?;

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }

        tracing::info!(event = "dataset_read", dataset = dataset.as_str(), rows = rows.len());
        Ok(rows)
    }

    async fn persist_report(&self, report: &PipelineReport) -> Result<()> {
        let json = serde_json::to_vec_pretty(report)?;
        self.storage
            .write_file(self.config.report_path(), &json)
            .await?;
        tracing::info!(event = "pipeline_completed", report = self.config.report_path());
        Ok(())
    }

    fn preview(
        &self,
        sales: &ValidationOutcome<DerivedSale>,
        financial: &ValidationOutcome<DerivedFinancial>,
        attendance: &ValidationOutcome<DerivedAttendance>,
    ) {
        tracing::info!(
            event = "merge_prepared",
            sales = sales.accepted.len(),
            financial = financial.accepted.len(),
            attendance = attendance.accepted.len()
        );
        if let Some(row) = sales.accepted.first() {
            tracing::debug!(dataset = "sales", row = ?row, "first accepted row");
        }
        if let Some(row) = financial.accepted.first() {
            tracing::debug!(dataset = "financial", row = ?row, "first accepted row");
        }
        if let Some(row) = attendance.accepted.first() {
            tracing::debug!(dataset = "attendance", row = ?row, "first accepted row");
        }
    }

    async fn apply_stage(&self, stage: &SqlStage) -> Result<()> {
        let path = format!("{}/{}", self.config.ddl_path(), stage.file);
        let template = self
            .storage
            .read_file(&path)
            .await
            .map_err(|e| EtlError::DataUnavailable {
                message: format!("SQL template {}: {}", path, e),
            })?;
        let template = String::from_utf8(template).map_err(|e| EtlError::DataUnavailable {
            message: format!("SQL template {} is not UTF-8: {}", path, e),
        })?;
        self.applier.apply(stage.name, &template).await
    }

    /// Exactly three statements in fixed order; the staging loads sit
    /// between the table DDL and the merge so the merge has data to read.
    /// The first failure stops the sequence.
    async fn apply_ddl(
        &self,
        sales: &[DerivedSale],
        financial: &[DerivedFinancial],
        attendance: &[DerivedAttendance],
    ) -> Result<()> {
        if self.config.dry_run() {
            tracing::info!(event = "dry_run_enabled", "warehouse execution skipped");
        }

        let [dataset_stage, tables_stage, merges_stage] = &SQL_STAGES;
        self.apply_stage(dataset_stage).await?;
        self.apply_stage(tables_stage).await?;

        self.applier
            .load("stg_sales", &transform::to_csv_bytes(sales)?, sales.len())
            .await?;
        self.applier
            .load(
                "stg_financial",
                &transform::to_csv_bytes(financial)?,
                financial.len(),
            )
            .await?;
        self.applier
            .load(
                "stg_attendance",
                &transform::to_csv_bytes(attendance)?,
                attendance.len(),
            )
            .await?;

        self.apply_stage(merges_stage).await
    }
}

fn guard_non_empty<T>(dataset: Dataset, outcome: &ValidationOutcome<T>) -> Result<()> {
    if outcome.accepted.is_empty() {
        return Err(EtlError::ValidationExhausted {
            dataset: dataset.as_str().to_string(),
        });
    }
    Ok(())
}

fn usd_bounds<T>(rows: &[T], value: impl Fn(&T) -> Option<f64>) -> (Option<f64>, Option<f64>) {
    let mut min = None;
    let mut max = None;
    for v in rows.iter().filter_map(value) {
        min = Some(min.map_or(v, |m: f64| m.min(v)));
        max = Some(max.map_or(v, |m: f64| m.max(v)));
    }
    (min, max)
}

fn dataset_report<T>(
    rows_read: usize,
    outcome: &ValidationOutcome<T>,
    bounds: (Option<f64>, Option<f64>),
) -> DatasetReport {
    DatasetReport {
        rows_read,
        rows_loaded: outcome.accepted.len(),
        rows_rejected: outcome.rejected.len(),
        usd_min: bounds.0,
        usd_max: bounds.1,
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider, W: Warehouse> Pipeline for WarehousePipeline<S, C, W> {
    async fn run(&self) -> Result<PipelineReport> {
        self.cleanup().await;
        self.generate().await?;

        let fx = self.load_fx_rates().await?;

        let sales = self.read_dataset(Dataset::Sales).await?;
        let financial = self.read_dataset(Dataset::Financial).await?;
        let attendance = self.read_dataset(Dataset::Attendance).await?;
        let sales_read = sales.len();
        let financial_read = financial.len();
        let attendance_read = attendance.len();

        let sales = transform::derive_sales(sales, &fx);
        let financial = transform::derive_financial(financial, &fx);
        let attendance = transform::derive_attendance(attendance);

        let mut sales = validate::validate_sales(sales, &fx);
        let mut financial = validate::validate_financial(financial, &fx);
        let mut attendance = validate::validate_attendance(attendance);

        guard_non_empty(Dataset::Sales, &sales)?;
        guard_non_empty(Dataset::Financial, &financial)?;
        guard_non_empty(Dataset::Attendance, &attendance)?;

        // One wall-clock timestamp per run, shared by every accepted row.
        let load_ts = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        for row in &mut sales.accepted {
            row.load_ts = Some(load_ts.clone());
        }
        for row in &mut financial.accepted {
            row.load_ts = Some(load_ts.clone());
        }
        for row in &mut attendance.accepted {
            row.load_ts = Some(load_ts.clone());
        }

        let report = PipelineReport {
            sales: dataset_report(
                sales_read,
                &sales,
                usd_bounds(&sales.accepted, |r| r.total_sales_usd),
            ),
            financial: dataset_report(
                financial_read,
                &financial,
                usd_bounds(&financial.accepted, |r| r.revenue_usd),
            ),
            attendance: dataset_report(attendance_read, &attendance, (None, None)),
        };

        self.persist_report(&report).await?;
        self.preview(&sales, &financial, &attendance);
        self.apply_ddl(&sales.accepted, &financial.accepted, &attendance.accepted)
            .await?;

        Ok(report)
    }
}
