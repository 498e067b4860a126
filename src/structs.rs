use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::money::{Money, Quantity};
use crate::tenant::TenantOwned;

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Caffe {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub street: String,
    pub postal_code: String,
    pub house_number: String,
    pub building_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, FromRow)]
pub struct Employee {
    pub id: i64,
    pub caffe_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone_number: String,
    pub favorite_coffee: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Company {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Expense {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
    pub company_id: Option<i64>,
    /// Joined from `companies` for display.
    pub company_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct CashReport {
    pub id: i64,
    pub caffe_id: i64,
    pub creator_id: i64,
    #[sqlx(try_from = "i64")]
    pub cash_before_shift: Money,
    #[sqlx(try_from = "i64")]
    pub cash_after_shift: Money,
    #[sqlx(try_from = "i64")]
    pub card_payments: Money,
    #[sqlx(try_from = "i64")]
    pub amount_due: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One expense paid out of the till during a shift.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct LineItem {
    pub id: i64,
    pub caffe_id: i64,
    pub cash_report_id: i64,
    pub expense_id: i64,
    pub expense_name: String,
    #[sqlx(try_from = "i64")]
    pub amount: Money,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Unit {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
    pub category_id: i64,
    pub unit_id: i64,
    pub unit_name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Report {
    pub id: i64,
    pub caffe_id: i64,
    pub creator_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct FullProduct {
    pub id: i64,
    pub caffe_id: i64,
    pub report_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_name: String,
    #[sqlx(try_from = "String")]
    pub amount: Quantity,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Stencil {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Position {
    pub id: i64,
    pub caffe_id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct WorkedHours {
    pub id: i64,
    pub caffe_id: i64,
    pub employee_id: i64,
    pub employee_first_name: String,
    pub position_id: Option<i64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

macro_rules! tenant_owned {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TenantOwned for $ty {
                fn caffe_id(&self) -> i64 {
                    self.caffe_id
                }
            }
        )+
    };
}

tenant_owned!(
    Employee,
    Company,
    Expense,
    CashReport,
    LineItem,
    Category,
    Unit,
    Product,
    Report,
    FullProduct,
    Stencil,
    Position,
    WorkedHours,
);

impl TenantOwned for Caffe {
    fn caffe_id(&self) -> i64 {
        self.id
    }
}

impl std::fmt::Display for Expense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.company_name {
            Some(company) => write!(f, "{}, {}", self.name, company),
            None => write!(f, "{}", self.name),
        }
    }
}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Report {}", self.created_at.format("%Y-%m-%d %H:%M"))
    }
}
