use crate::domain::model::{
    AttendanceRecord, DerivedAttendance, DerivedFinancial, DerivedSale, FinancialRecord,
    SaleRecord,
};
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct FxRateRow {
    currency_code: String,
    rate_to_usd: f64,
}

/// Currency code to rate-to-USD mapping, loaded once per run. An unknown
/// code is an expected state (unsupported currency), not an error.
#[derive(Debug, Clone, Default)]
pub struct FxRateTable {
    rates: HashMap<String, f64>,
}

impl FxRateTable {
    /// Parses `currency_code,rate_to_usd` rows. Duplicate codes resolve
    /// deterministically: the last row wins. An empty table, an unparseable
    /// row, or a non-positive rate is malformed reference data.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data);
        let mut rates = HashMap::new();

        for row in reader.deserialize::<FxRateRow>() {
            let row = row.map_err(|e| EtlError::DataUnavailable {
                message: format!("malformed FX rate row: {}", e),
            })?;
            if row.rate_to_usd <= 0.0 {
                return Err(EtlError::DataUnavailable {
                    message: format!(
                        "non-positive FX rate for {}: {}",
                        row.currency_code, row.rate_to_usd
                    ),
                });
            }
            rates.insert(row.currency_code, row.rate_to_usd);
        }

        if rates.is_empty() {
            return Err(EtlError::DataUnavailable {
                message: "FX rate table is empty".to_string(),
            });
        }

        Ok(Self { rates })
    }

    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.rates.contains_key(currency)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Converts `amount` into USD, rounded to 2 decimal places half away from
/// zero. `None` when the currency is not in the table. Pure: no state, same
/// inputs always give the same output.
pub fn convert_to_usd(amount: f64, currency: &str, fx: &FxRateTable) -> Option<f64> {
    fx.rate(currency).map(|rate| round2(amount * rate))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// USD columns are computed for every row, including rows validation will
/// later reject. Unsupported currencies yield absent values; the validators
/// re-check the table membership on their own.
pub fn derive_sales(rows: Vec<SaleRecord>, fx: &FxRateTable) -> Vec<DerivedSale> {
    rows.into_iter()
        .map(|r| {
            let unit_price_usd = convert_to_usd(r.unit_price, &r.currency, fx);
            let total_sales_usd = convert_to_usd(r.total_sales, &r.currency, fx);
            DerivedSale {
                sale_id: r.sale_id,
                region: r.region,
                country: r.country,
                product: r.product,
                date: r.date,
                currency: r.currency,
                quantity: r.quantity,
                unit_price: r.unit_price,
                total_sales: r.total_sales,
                unit_price_usd,
                total_sales_usd,
                load_ts: None,
            }
        })
        .collect()
}

pub fn derive_financial(rows: Vec<FinancialRecord>, fx: &FxRateTable) -> Vec<DerivedFinancial> {
    rows.into_iter()
        .map(|r| {
            let revenue_usd = convert_to_usd(r.revenue, &r.currency, fx);
            let expense_usd = convert_to_usd(r.expense, &r.currency, fx);
            let profit_usd = convert_to_usd(r.profit, &r.currency, fx);
            DerivedFinancial {
                transaction_id: r.transaction_id,
                region: r.region,
                country: r.country,
                product: r.product,
                date: r.date,
                currency: r.currency,
                revenue: r.revenue,
                expense: r.expense,
                profit: r.profit,
                revenue_usd,
                expense_usd,
                profit_usd,
                load_ts: None,
            }
        })
        .collect()
}

pub fn derive_attendance(rows: Vec<AttendanceRecord>) -> Vec<DerivedAttendance> {
    rows.into_iter()
        .map(|r| DerivedAttendance {
            staff_id: r.staff_id,
            name: r.name,
            region: r.region,
            country: r.country,
            department: r.department,
            date: r.date,
            status: r.status,
            check_in_time: r.check_in_time,
            check_out_time: r.check_out_time,
            load_ts: None,
        })
        .collect()
}

/// Encodes rows as headered CSV, the in-memory tabular shape the warehouse
/// bulk-load accepts.
pub fn to_csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}
