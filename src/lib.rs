pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{cli::LocalStorage, CliConfig};
pub use crate::core::etl::EtlEngine;
pub use crate::core::pipeline::WarehousePipeline;
pub use crate::core::producers::{SampleProducer, ScriptProducer};
pub use crate::core::warehouse::NoopWarehouse;
pub use crate::utils::error::{EtlError, Result};
