use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A money account (bank, wallet, cash...). The balance is computed by the
/// backend from incomes, expenses and transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub balance: Decimal,
}

/// Body for creating or renaming an account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInput {
    pub name: String,
}

impl AccountInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_account_with_string_balance() {
        let json = r#"{"id": 3, "name": "HDFC Savings", "balance": "15230.50", "user": 1}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, 3);
        assert_eq!(account.name, "HDFC Savings");
        assert_eq!(account.balance, Decimal::from_str("15230.50").unwrap());
    }

    #[test]
    fn test_parse_account_without_balance() {
        let account: Account = serde_json::from_str(r#"{"id": 1, "name": "Cash"}"#).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
    }
}
