use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{require_id, require_money, require_text, FieldErrors, FieldKind, FieldMeta, Form};
use crate::money::Money;

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct CompanyForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
}

impl Form for CompanyForm {
    const NAME: &'static str = "company";
    const FIELDS: &'static [FieldMeta] =
        &[FieldMeta::required("name", "Name", FieldKind::Text).with_placeholder("GoodCake")];
    type Cleaned = String;

    fn clean(&self) -> Result<String, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => FieldErrors::from(e),
        };
        require_text(&mut errors, "name", &self.name);
        errors.finish(|| self.name.trim().to_owned())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct ExpenseForm {
    #[validate(length(max = 300, message = "Ensure this value has at most 300 characters."))]
    pub name: String,
    pub company: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanExpense {
    pub name: String,
    pub company_id: Option<i64>,
}

impl Form for ExpenseForm {
    const NAME: &'static str = "expense";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("name", "Name", FieldKind::Text).with_placeholder("Cakes"),
        FieldMeta::optional("company", "Company", FieldKind::Choice),
    ];
    type Cleaned = CleanExpense;

    fn clean(&self) -> Result<CleanExpense, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => FieldErrors::from(e),
        };
        require_text(&mut errors, "name", &self.name);
        errors.finish(|| CleanExpense {
            name: self.name.trim().to_owned(),
            company_id: self.company,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LineItemForm {
    pub expense: Option<i64>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanLineItem {
    pub expense_id: i64,
    pub amount: Money,
}

impl Form for LineItemForm {
    const NAME: &'static str = "line_item";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("expense", "Paid for", FieldKind::Choice),
        FieldMeta::required("amount", "Amount", FieldKind::Money),
    ];
    type Cleaned = CleanLineItem;

    fn clean(&self) -> Result<CleanLineItem, FieldErrors> {
        let mut errors = FieldErrors::default();
        let expense_id = require_id(&mut errors, "expense", self.expense);
        let amount = require_money(&mut errors, "amount", self.amount);
        match (expense_id, amount) {
            (Some(expense_id), Some(amount)) => Ok(CleanLineItem { expense_id, amount }),
            _ => Err(errors),
        }
    }
}

/// One shift's till figures plus what was paid out of it.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CashReportForm {
    pub cash_before_shift: Option<Decimal>,
    pub cash_after_shift: Option<Decimal>,
    pub card_payments: Option<Decimal>,
    pub amount_due: Option<Decimal>,
    pub expenses: Vec<LineItemForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanCashReport {
    pub cash_before_shift: Money,
    pub cash_after_shift: Money,
    pub card_payments: Money,
    pub amount_due: Money,
    pub line_items: Vec<CleanLineItem>,
}

impl Form for CashReportForm {
    const NAME: &'static str = "cash_report";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("cash_before_shift", "Cash at the start of the shift", FieldKind::Money),
        FieldMeta::required("cash_after_shift", "Cash at the end of the shift", FieldKind::Money),
        FieldMeta::required("card_payments", "Card payments", FieldKind::Money),
        FieldMeta::required("amount_due", "Total amount due", FieldKind::Money),
        FieldMeta::optional("expenses", "Expenses", FieldKind::Collection),
    ];
    type Cleaned = CleanCashReport;

    fn clean(&self) -> Result<CleanCashReport, FieldErrors> {
        let mut errors = FieldErrors::default();
        let cash_before_shift = require_money(&mut errors, "cash_before_shift", self.cash_before_shift);
        let cash_after_shift = require_money(&mut errors, "cash_after_shift", self.cash_after_shift);
        let card_payments = require_money(&mut errors, "card_payments", self.card_payments);
        let amount_due = require_money(&mut errors, "amount_due", self.amount_due);

        let mut line_items = Vec::with_capacity(self.expenses.len());
        let mut seen = HashSet::new();
        for (index, item) in self.expenses.iter().enumerate() {
            match item.clean() {
                Ok(item) => {
                    if !seen.insert(item.expense_id) {
                        errors.add(
                            "expenses",
                            "Cash report should not contain two same expenses.",
                        );
                    }
                    line_items.push(item);
                }
                Err(e) => errors.merge_prefixed(&format!("expenses.{}", index), e),
            }
        }

        match (cash_before_shift, cash_after_shift, card_payments, amount_due) {
            (Some(cash_before_shift), Some(cash_after_shift), Some(card_payments), Some(amount_due))
                if errors.is_empty() =>
            {
                Ok(CleanCashReport {
                    cash_before_shift,
                    cash_after_shift,
                    card_payments,
                    amount_due,
                    line_items,
                })
            }
            _ => Err(errors),
        }
    }
}
