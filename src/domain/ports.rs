use crate::domain::model::PipelineReport;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Returns false when the file was already absent.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn project(&self) -> &str;
    fn dataset(&self) -> &str;
    fn location(&self) -> &str;
    fn dry_run(&self) -> bool;
    fn fx_rates_path(&self) -> &str;
    fn ddl_path(&self) -> &str;
    fn report_path(&self) -> &str;
}

/// An external unit of work that materializes one dataset file. The pipeline
/// only learns pass/fail.
#[async_trait]
pub trait DatasetProducer: Send + Sync {
    fn name(&self) -> &str;
    async fn produce(&self) -> Result<()>;
}

/// Opaque warehouse handle: execute a statement and wait, or bulk-load a
/// table with full-overwrite semantics.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<()>;
    async fn load_table(&self, table: &str, data: &[u8]) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn run(&self) -> Result<PipelineReport>;
}
