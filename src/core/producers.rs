use crate::core::transform::round2;
use crate::domain::model::{AttendanceRecord, Dataset, FinancialRecord, SaleRecord};
use crate::domain::ports::DatasetProducer;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Runs an external generator script and reports pass/fail. Any non-zero
/// exit status is fatal to the run.
pub struct ScriptProducer {
    interpreter: String,
    script: String,
}

impl ScriptProducer {
    pub fn new(interpreter: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }
}

#[async_trait]
impl DatasetProducer for ScriptProducer {
    fn name(&self) -> &str {
        &self.script
    }

    async fn produce(&self) -> Result<()> {
        let status = Command::new(&self.interpreter)
            .arg(&self.script)
            .status()
            .await?;

        if !status.success() {
            return Err(EtlError::ProducerFailure {
                script: self.script.clone(),
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

const COUNTRIES: [(&str, &str, &str); 6] = [
    ("North America", "USA", "USD"),
    ("Europe", "Germany", "EUR"),
    ("Asia", "Japan", "JPY"),
    ("Europe", "UK", "GBP"),
    ("North America", "Canada", "CAD"),
    ("Asia", "India", "INR"),
];

const PRODUCTS: [&str; 5] = ["Software", "Hardware", "Consulting", "Cloud Services", "Licenses"];

const DEPARTMENTS: [&str; 6] = ["IT", "Sales", "Marketing", "HR", "Finance", "Operations"];

const FIRST_NAMES: [&str; 5] = ["Alice", "Bob", "Chen", "Daniela", "Ethan"];

const LAST_NAMES: [&str; 5] = ["Johnson", "Smith", "Wei", "Lopez", "Brown"];

const STATUSES: [&str; 5] = ["Present", "Present", "Remote", "Present", "Absent"];

/// In-process stand-in for the external generator scripts: writes a small
/// deterministic dataset with the real schemas, including a few rows that
/// exercise each rejection rule. Row 0 is always valid, so a one-row sample
/// still passes the non-empty guard.
pub struct SampleProducer {
    dataset: Dataset,
    path: PathBuf,
    rows: usize,
}

impl SampleProducer {
    pub fn new(dataset: Dataset, path: impl Into<PathBuf>, rows: usize) -> Self {
        Self {
            dataset,
            path: path.into(),
            rows,
        }
    }

    fn write_sales(&self, writer: &mut csv::Writer<std::fs::File>) -> Result<()> {
        for i in 0..self.rows {
            let (region, country, currency) = COUNTRIES[i % COUNTRIES.len()];
            let currency = if i % 11 == 5 { "XXX" } else { currency };
            let quantity = if i % 13 == 7 { 0 } else { (i % 50 + 1) as i64 };
            let unit_price = round2(100.0 + (i as f64 * 7.5) % 4900.0);
            writer.serialize(SaleRecord {
                sale_id: Some(format!("S{:07}", i + 1)),
                region: region.to_string(),
                country: country.to_string(),
                product: PRODUCTS[i % PRODUCTS.len()].to_string(),
                date: format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                currency: currency.to_string(),
                quantity,
                unit_price,
                total_sales: round2(quantity as f64 * unit_price),
            })?;
        }
        Ok(())
    }

    fn write_financial(&self, writer: &mut csv::Writer<std::fs::File>) -> Result<()> {
        for i in 0..self.rows {
            let (region, country, currency) = COUNTRIES[i % COUNTRIES.len()];
            let currency = if i % 11 == 5 { "XXX" } else { currency };
            let revenue = round2(1000.0 + (i as f64 * 37.25) % 99000.0);
            let expense = round2(revenue * 0.6);
            let mut profit = round2(revenue - expense);
            if i % 13 == 7 {
                profit = round2(profit + 5.0);
            }
            writer.serialize(FinancialRecord {
                transaction_id: Some(format!("T{:07}", i + 1)),
                region: region.to_string(),
                country: country.to_string(),
                product: PRODUCTS[i % PRODUCTS.len()].to_string(),
                date: format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                currency: currency.to_string(),
                revenue,
                expense,
                profit,
            })?;
        }
        Ok(())
    }

    fn write_attendance(&self, writer: &mut csv::Writer<std::fs::File>) -> Result<()> {
        for i in 0..self.rows {
            let (region, country, _) = COUNTRIES[i % COUNTRIES.len()];
            let status = if i % 11 == 5 {
                "OnLeave"
            } else {
                STATUSES[i % STATUSES.len()]
            };
            let present = status == "Present" || status == "Remote";
            writer.serialize(AttendanceRecord {
                staff_id: Some(format!("ST{:07}", i + 1)),
                name: format!(
                    "{} {}",
                    FIRST_NAMES[i % FIRST_NAMES.len()],
                    LAST_NAMES[i % LAST_NAMES.len()]
                ),
                region: region.to_string(),
                country: country.to_string(),
                department: DEPARTMENTS[i % DEPARTMENTS.len()].to_string(),
                date: format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                status: status.to_string(),
                check_in_time: present.then(|| format!("{:02}:{:02}", 8 + i % 3, i % 60)),
                check_out_time: present.then(|| format!("{:02}:{:02}", 16 + i % 3, i % 60)),
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl DatasetProducer for SampleProducer {
    fn name(&self) -> &str {
        self.dataset.as_str()
    }

    async fn produce(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;

        match self.dataset {
            Dataset::Sales => self.write_sales(&mut writer)?,
            Dataset::Financial => self.write_financial(&mut writer)?,
            Dataset::Attendance => self.write_attendance(&mut writer)?,
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sample_producer_writes_readable_sales() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(Dataset::Sales.file_name());
        let producer = SampleProducer::new(Dataset::Sales, &path, 20);

        producer.produce().await.unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<SaleRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].sale_id.as_deref(), Some("S0000001"));
        assert!(rows[0].quantity > 0);
        // The sprinkle rows exercise the rejection rules.
        assert!(rows.iter().any(|r| r.currency == "XXX"));
        assert!(rows.iter().any(|r| r.quantity == 0));
    }

    #[tokio::test]
    async fn test_sample_producer_writes_readable_attendance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(Dataset::Attendance.file_name());
        let producer = SampleProducer::new(Dataset::Attendance, &path, 12);

        producer.produce().await.unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<AttendanceRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().any(|r| r.status == "OnLeave"));
        let absent = rows.iter().find(|r| r.status == "Absent").unwrap();
        assert!(absent.check_in_time.is_none());
    }

    #[tokio::test]
    async fn test_script_producer_reports_nonzero_exit() {
        // sh exits 127 when the script does not exist.
        let producer = ScriptProducer::new("sh", "definitely_missing_script.sh");

        let err = producer.produce().await.unwrap_err();
        assert!(matches!(err, EtlError::ProducerFailure { .. }));
    }

    #[tokio::test]
    async fn test_script_producer_accepts_zero_exit() {
        let producer = ScriptProducer::new("true", "noop");
        producer.produce().await.unwrap();
    }
}
