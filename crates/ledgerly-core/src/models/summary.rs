use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dashboard payload from `summary/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub totals: Totals,
    pub balances: Balances,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    #[serde(default)]
    pub transfers_in: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(default)]
    pub by_account: Vec<AccountBalance>,
    pub total_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: i64,
    pub account: String,
    pub balance: Decimal,
}

/// One row of `expenses/monthly-cashflow/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowMonth {
    /// First day of the month as sent by the backend, e.g. `2025-03-01`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    #[serde(default)]
    pub net: Decimal,
}

impl CashflowMonth {
    /// `YYYY-MM` label for the month.
    pub fn label(&self) -> &str {
        crate::utils::month_label(&self.month)
    }
}

/// One row of `expenses/totals_by_category/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}
