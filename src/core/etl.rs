use crate::core::Pipeline;
use crate::domain::model::PipelineReport;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<PipelineReport> {
        tracing::info!(event = "pipeline_start");

        let report = self.pipeline.run().await?;

        tracing::info!(
            event = "pipeline_done",
            sales_loaded = report.sales.rows_loaded,
            financial_loaded = report.financial.rows_loaded,
            attendance_loaded = report.attendance.rows_loaded
        );
        Ok(report)
    }
}
