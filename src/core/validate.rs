use crate::core::transform::FxRateTable;
use crate::domain::model::{
    DerivedAttendance, DerivedFinancial, DerivedSale, RejectReason, ValidationOutcome,
};

const ALLOWED_STATUSES: [&str; 3] = ["Present", "Absent", "Remote"];

/// Profit must reconcile with revenue minus expense within one cent.
const PROFIT_TOLERANCE: f64 = 0.01;

fn missing(id: &Option<String>) -> bool {
    id.as_deref().map_or(true, |s| s.is_empty())
}

/// Rules run in fixed priority order; the first match decides the rejection
/// reason. The currency rule tests table membership directly and never looks
/// at the pre-computed USD columns.
pub fn validate_sales(
    rows: Vec<DerivedSale>,
    fx: &FxRateTable,
) -> ValidationOutcome<DerivedSale> {
    let mut outcome = ValidationOutcome::new();
    for row in rows {
        if missing(&row.sale_id) {
            outcome.rejected.push(RejectReason::MissingSaleId);
        } else if !fx.contains(&row.currency) {
            outcome.rejected.push(RejectReason::UnsupportedCurrency);
        } else if row.quantity <= 0 {
            outcome.rejected.push(RejectReason::InvalidQuantity);
        } else {
            outcome.accepted.push(row);
        }
    }
    outcome
}

pub fn validate_financial(
    rows: Vec<DerivedFinancial>,
    fx: &FxRateTable,
) -> ValidationOutcome<DerivedFinancial> {
    let mut outcome = ValidationOutcome::new();
    for row in rows {
        if missing(&row.transaction_id) {
            outcome.rejected.push(RejectReason::MissingTransactionId);
        } else if !fx.contains(&row.currency) {
            outcome.rejected.push(RejectReason::UnsupportedCurrency);
        } else if (row.profit - (row.revenue - row.expense)).abs() > PROFIT_TOLERANCE {
            outcome.rejected.push(RejectReason::ProfitMismatch);
        } else {
            outcome.accepted.push(row);
        }
    }
    outcome
}

/// Attendance has no monetary rule, so no FX table is involved.
pub fn validate_attendance(rows: Vec<DerivedAttendance>) -> ValidationOutcome<DerivedAttendance> {
    let mut outcome = ValidationOutcome::new();
    for row in rows {
        if missing(&row.staff_id) {
            outcome.rejected.push(RejectReason::MissingStaffId);
        } else if !ALLOWED_STATUSES.contains(&row.status.as_str()) {
            outcome.rejected.push(RejectReason::InvalidStatus);
        } else {
            outcome.accepted.push(row);
        }
    }
    outcome
}
