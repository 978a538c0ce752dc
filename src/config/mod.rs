pub mod cli;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "warehouse-etl")]
#[command(about = "Validates, converts and loads the demo datasets into a warehouse")]
pub struct CliConfig {
    #[arg(long, env = "GCP_PROJECT", default_value = "demo_project")]
    pub project: String,

    #[arg(long, env = "BQ_DATASET", default_value = "demo_dataset")]
    pub dataset: String,

    #[arg(long, env = "BQ_LOCATION", default_value = "US")]
    pub location: String,

    #[arg(long, env = "DRY_RUN", help = "Skip all warehouse mutation")]
    pub dry_run: bool,

    #[arg(long, default_value = ".", help = "Base directory for inputs and outputs")]
    pub data_path: String,

    #[arg(long, default_value = "data/fx_rates.csv")]
    pub fx_rates: String,

    #[arg(long, default_value = "ddl")]
    pub ddl_path: String,

    #[arg(long, default_value = "reports/summary.json")]
    pub report_path: String,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Producer scripts; built-in sample data when empty"
    )]
    pub scripts: Vec<String>,

    #[arg(long, default_value = "python3", help = "Interpreter for producer scripts")]
    pub interpreter: String,

    #[arg(long, default_value = "50", help = "Rows per built-in sample dataset")]
    pub sample_rows: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("project", &self.project)?;
        validation::validate_non_empty_string("dataset", &self.dataset)?;
        validation::validate_non_empty_string("location", &self.location)?;
        validation::validate_path("data_path", &self.data_path)?;
        validation::validate_path("fx_rates", &self.fx_rates)?;
        validation::validate_path("ddl_path", &self.ddl_path)?;
        validation::validate_path("report_path", &self.report_path)?;
        validation::validate_positive_number("sample_rows", self.sample_rows, 1)?;
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn project(&self) -> &str {
        &self.project
    }

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn fx_rates_path(&self) -> &str {
        &self.fx_rates
    }

    fn ddl_path(&self) -> &str {
        &self.ddl_path
    }

    fn report_path(&self) -> &str {
        &self.report_path
    }
}
