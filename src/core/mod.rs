pub mod etl;
pub mod pipeline;
pub mod producers;
pub mod transform;
pub mod validate;
pub mod warehouse;

pub use crate::domain::model::{PipelineReport, ValidationOutcome};
pub use crate::domain::ports::{ConfigProvider, DatasetProducer, Pipeline, Storage, Warehouse};
pub use crate::utils::error::Result;
