//! Shift reconciliation.

use serde::Serialize;

use crate::money::Money;
use crate::structs::{CashReport, LineItem};

/// Surplus (positive) or deficit (negative) of a shift:
///
/// `cash_after_shift + card_payments + Σ line items − cash_before_shift − amount_due`
///
/// A report without line items contributes zero for the expense term.
pub fn balance(report: &CashReport, line_items: &[LineItem]) -> Money {
    let expenses: Money = line_items.iter().map(|item| item.amount).sum();

    report.cash_after_shift + report.card_payments + expenses
        - report.cash_before_shift
        - report.amount_due
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "amount", rename_all = "lowercase")]
pub enum Reconciliation {
    Balanced,
    Surplus(Money),
    Deficit(Money),
}

impl Reconciliation {
    pub fn of(balance: Money) -> Self {
        if balance.is_zero() {
            Reconciliation::Balanced
        } else if balance.is_negative() {
            Reconciliation::Deficit(balance.abs())
        } else {
            Reconciliation::Surplus(balance)
        }
    }
}

/// A cash report with its line items and derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct CashReportDetail {
    pub report: CashReport,
    pub line_items: Vec<LineItem>,
    pub expenses_total: Money,
    pub balance: Money,
    pub reconciliation: Reconciliation,
}

impl CashReportDetail {
    pub fn new(report: CashReport, line_items: Vec<LineItem>) -> Self {
        let expenses_total = line_items.iter().map(|item| item.amount).sum();
        let balance = balance(&report, &line_items);
        Self {
            report,
            line_items,
            expenses_total,
            balance,
            reconciliation: Reconciliation::of(balance),
        }
    }
}
