use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Expense, Income, Transfer};

/// Default number of entries shown as recent activity.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityKind {
    Expense,
    Income,
    Transfer,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityKind::Expense => "Expense",
            ActivityKind::Income => "Income",
            ActivityKind::Transfer => "Transfer",
        };
        f.write_str(name)
    }
}

/// An expense, income or transfer flattened for a combined timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ActivityEntry {
    /// The description when there is one, otherwise the formatted amount.
    pub fn label(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(desc) if !desc.is_empty() => desc.to_string(),
            _ => crate::utils::format_currency(self.amount),
        }
    }
}

impl From<Expense> for ActivityEntry {
    fn from(e: Expense) -> Self {
        Self {
            kind: ActivityKind::Expense,
            id: e.id,
            amount: e.amount,
            description: e.description,
            created_at: e.created_at,
        }
    }
}

impl From<Income> for ActivityEntry {
    fn from(i: Income) -> Self {
        Self {
            kind: ActivityKind::Income,
            id: i.id,
            amount: i.amount,
            description: i.description,
            created_at: i.created_at,
        }
    }
}

impl From<Transfer> for ActivityEntry {
    fn from(t: Transfer) -> Self {
        Self {
            kind: ActivityKind::Transfer,
            id: t.id,
            amount: t.amount,
            description: t.description,
            created_at: t.created_at,
        }
    }
}

/// Merge all three lists, newest first, keeping at most `limit` entries.
/// Entries without a timestamp sort last.
pub fn merge_recent(
    expenses: Vec<Expense>,
    incomes: Vec<Income>,
    transfers: Vec<Transfer>,
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut entries: Vec<ActivityEntry> = expenses
        .into_iter()
        .map(ActivityEntry::from)
        .chain(incomes.into_iter().map(ActivityEntry::from))
        .chain(transfers.into_iter().map(ActivityEntry::from))
        .collect();

    entries.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    entries.truncate(limit);
    entries
}
