use serde::{Deserialize, Serialize};
use std::fmt;

/// The three input datasets the pipeline processes, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Sales,
    Financial,
    Attendance,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Sales, Dataset::Financial, Dataset::Attendance];

    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Sales => "sales",
            Dataset::Financial => "financial",
            Dataset::Attendance => "attendance",
        }
    }

    /// File name the dataset's producer materializes and the pipeline reads.
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Sales => "sales_dataset_3m.csv",
            Dataset::Financial => "financial_dataset_3m.csv",
            Dataset::Attendance => "attendance_dataset_3m.csv",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the sales input file. Identifier columns are optional because
/// empty CSV fields deserialize to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "SaleID")]
    pub sale_id: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "TotalSales")]
    pub total_sales: f64,
}

/// One row of the financial input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    #[serde(rename = "TransactionID")]
    pub transaction_id: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "Expense")]
    pub expense: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
}

/// One row of the attendance input file. Check-in/out columns are empty for
/// absent staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "StaffID")]
    pub staff_id: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "CheckInTime")]
    pub check_in_time: Option<String>,
    #[serde(rename = "CheckOutTime")]
    pub check_out_time: Option<String>,
}

/// Sales row with USD columns computed over the FX rate table. `load_ts` is
/// stamped on accepted rows only.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedSale {
    #[serde(rename = "SaleID")]
    pub sale_id: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "TotalSales")]
    pub total_sales: f64,
    pub unit_price_usd: Option<f64>,
    pub total_sales_usd: Option<f64>,
    pub load_ts: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivedFinancial {
    #[serde(rename = "TransactionID")]
    pub transaction_id: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "Expense")]
    pub expense: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    pub revenue_usd: Option<f64>,
    pub expense_usd: Option<f64>,
    pub profit_usd: Option<f64>,
    pub load_ts: Option<String>,
}

/// Attendance row ready for loading. No monetary columns; only the load
/// timestamp is added over the raw record.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedAttendance {
    #[serde(rename = "StaffID")]
    pub staff_id: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "CheckInTime")]
    pub check_in_time: Option<String>,
    #[serde(rename = "CheckOutTime")]
    pub check_out_time: Option<String>,
    pub load_ts: Option<String>,
}

/// Why a row was excluded from the accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingSaleId,
    MissingTransactionId,
    MissingStaffId,
    UnsupportedCurrency,
    InvalidQuantity,
    ProfitMismatch,
    InvalidStatus,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::MissingSaleId => "missing_sale_id",
            RejectReason::MissingTransactionId => "missing_transaction_id",
            RejectReason::MissingStaffId => "missing_staff_id",
            RejectReason::UnsupportedCurrency => "unsupported_currency",
            RejectReason::InvalidQuantity => "invalid_quantity",
            RejectReason::ProfitMismatch => "profit_mismatch",
            RejectReason::InvalidStatus => "invalid_status",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition of a dataset: accepted rows keep their input order, rejected
/// rows survive only as a tally of reason codes in row-scan order.
#[derive(Debug, Clone)]
pub struct ValidationOutcome<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<RejectReason>,
}

impl<T> ValidationOutcome<T> {
    pub fn new() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Default for ValidationOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-dataset slice of the summary report. The USD bounds are absent for
/// attendance, which has no monetary column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub rows_rejected: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub sales: DatasetReport,
    pub financial: DatasetReport,
    pub attendance: DatasetReport,
}
