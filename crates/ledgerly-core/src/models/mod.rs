//! Data models for the finance tracker backend.
//!
//! - `Account`, `Category`: reference data, with input bodies for create/update
//! - `Expense`, `Income`, `Transfer`: transactions and their `New*` bodies
//! - `Summary`, `CashflowMonth`, `CategoryTotal`: dashboard aggregates
//! - `ReportFilter`: date range/account filter for the report endpoints
//! - `ActivityEntry`: merged recent-activity timeline

pub mod account;
pub mod activity;
pub mod category;
pub mod filter;
pub mod summary;
pub mod transaction;

pub use account::{Account, AccountInput};
pub use activity::{merge_recent, ActivityEntry, ActivityKind, DEFAULT_RECENT_LIMIT};
pub use category::{Category, CategoryInput};
pub use filter::ReportFilter;
pub use summary::{AccountBalance, Balances, CashflowMonth, CategoryTotal, Summary, Totals};
pub use transaction::{Expense, Income, NewExpense, NewIncome, NewTransfer, Transfer};
