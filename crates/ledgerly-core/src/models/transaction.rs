use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal,
    /// Category id
    pub category: Option<i64>,
    /// Account id
    pub account: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    pub amount: Decimal,
    pub category: i64,
    pub account: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    pub amount: Decimal,
    /// Account id
    pub account: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIncome {
    pub amount: Decimal,
    pub account: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account: i64,
    pub to_account: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTransfer {
    pub from_account: i64,
    pub to_account: i64,
    pub amount: Decimal,
}

impl NewTransfer {
    /// The backend rejects transfers to the same account; catch it early.
    pub fn is_valid(&self) -> bool {
        self.from_account != self.to_account && self.amount > Decimal::ZERO
    }
}
