//! Plain-text and JSON rendering of command results.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

use ledgerly_core::models::{
    Account, ActivityEntry, CashflowMonth, Category, CategoryTotal, Expense, Income, Summary,
    Transfer,
};
use ledgerly_core::utils::{format_currency, format_date, truncate_string};

/// Longest description shown in list rows
const DESCRIPTION_WIDTH: usize = 32;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// id -> name lookup for rendering foreign keys.
fn names<'a, I>(pairs: I) -> HashMap<i64, &'a str>
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    pairs.into_iter().collect()
}

fn name_or_id(names: &HashMap<i64, &str>, id: Option<i64>) -> String {
    match id {
        Some(id) => names
            .get(&id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("#{}", id)),
        None => "-".to_string(),
    }
}

fn description(text: &Option<String>) -> String {
    truncate_string(text.as_deref().unwrap_or(""), DESCRIPTION_WIDTH)
}

pub fn accounts(accounts: &[Account], json: bool) -> Result<()> {
    if json {
        return print_json(accounts);
    }
    if accounts.is_empty() {
        println!("No accounts yet.");
        return Ok(());
    }
    for account in accounts {
        println!("{:>5}  {:<24} {:>16}", account.id, account.name, format_currency(account.balance));
    }
    Ok(())
}

pub fn categories(categories: &[Category], json: bool) -> Result<()> {
    if json {
        return print_json(categories);
    }
    if categories.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }
    for category in categories {
        println!("{:>5}  {}", category.id, category.name);
    }
    Ok(())
}

pub fn expenses(
    expenses: &[Expense],
    categories: &[Category],
    accounts: &[Account],
    json: bool,
) -> Result<()> {
    if json {
        return print_json(expenses);
    }
    if expenses.is_empty() {
        println!("No expenses yet.");
        return Ok(());
    }
    let category_names = names(categories.iter().map(|c| (c.id, c.name.as_str())));
    let account_names = names(accounts.iter().map(|a| (a.id, a.name.as_str())));

    for expense in expenses {
        println!(
            "{:>5}  {:>14}  {:<16} {:<16} {}",
            expense.id,
            format_currency(expense.amount),
            name_or_id(&category_names, expense.category),
            name_or_id(&account_names, expense.account),
            description(&expense.description),
        );
    }
    Ok(())
}

pub fn incomes(incomes: &[Income], accounts: &[Account], json: bool) -> Result<()> {
    if json {
        return print_json(incomes);
    }
    if incomes.is_empty() {
        println!("No incomes yet.");
        return Ok(());
    }
    let account_names = names(accounts.iter().map(|a| (a.id, a.name.as_str())));

    for income in incomes {
        println!(
            "{:>5}  {:>14}  {:<16} {}",
            income.id,
            format_currency(income.amount),
            name_or_id(&account_names, income.account),
            description(&income.description),
        );
    }
    Ok(())
}

pub fn transfers(transfers: &[Transfer], accounts: &[Account], json: bool) -> Result<()> {
    if json {
        return print_json(transfers);
    }
    if transfers.is_empty() {
        println!("No transfers yet.");
        return Ok(());
    }
    let account_names = names(accounts.iter().map(|a| (a.id, a.name.as_str())));

    for transfer in transfers {
        println!(
            "{:>5}  {:>14}  {} -> {}",
            transfer.id,
            format_currency(transfer.amount),
            name_or_id(&account_names, Some(transfer.from_account)),
            name_or_id(&account_names, Some(transfer.to_account)),
        );
    }
    Ok(())
}

pub fn summary(summary: &Summary, json: bool) -> Result<()> {
    if json {
        return print_json(summary);
    }
    let totals = &summary.totals;
    println!("Income        {:>16}", format_currency(totals.income));
    println!("Expenses      {:>16}", format_currency(totals.expense));
    println!("Transfers in  {:>16}", format_currency(totals.transfers_in));
    println!("Net           {:>16}", format_currency(totals.net));
    println!();
    println!("Account balances");
    for balance in &summary.balances.by_account {
        println!("  {:<24} {:>16}", balance.account, format_currency(balance.balance));
    }
    println!("Total balance {:>16}", format_currency(summary.balances.total_balance));
    Ok(())
}

pub fn cashflow(rows: &[CashflowMonth], json: bool) -> Result<()> {
    if json {
        return print_json(rows);
    }
    if rows.is_empty() {
        println!("No data available.");
        return Ok(());
    }
    println!("{:<8} {:>16} {:>16} {:>16}", "Month", "Income", "Expense", "Net");
    for row in rows {
        println!(
            "{:<8} {:>16} {:>16} {:>16}",
            row.label(),
            format_currency(row.income),
            format_currency(row.expense),
            format_currency(row.net),
        );
    }
    Ok(())
}

pub fn category_totals(rows: &[CategoryTotal], json: bool) -> Result<()> {
    if json {
        return print_json(rows);
    }
    if rows.is_empty() {
        println!("No data available.");
        return Ok(());
    }
    for row in rows {
        println!("{:<24} {:>16}", row.category, format_currency(row.total));
    }
    Ok(())
}

pub fn activity(entries: &[ActivityEntry], json: bool) -> Result<()> {
    if json {
        return print_json(entries);
    }
    if entries.is_empty() {
        println!("No recent activity.");
        return Ok(());
    }
    for entry in entries {
        let date = entry
            .created_at
            .as_ref()
            .map(format_date)
            .unwrap_or_default();
        println!(
            "{:<9} {:<34} {:>14}  {}",
            entry.kind.to_string(),
            truncate_string(&entry.label(), DESCRIPTION_WIDTH),
            format_currency(entry.amount),
            date,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_or_id() {
        let lookup = names(vec![(1, "Cash"), (2, "HDFC")]);
        assert_eq!(name_or_id(&lookup, Some(2)), "HDFC");
        assert_eq!(name_or_id(&lookup, Some(9)), "#9");
        assert_eq!(name_or_id(&lookup, None), "-");
    }

    #[test]
    fn test_description_truncated() {
        let long = Some("a".repeat(40));
        assert_eq!(description(&long).chars().count(), DESCRIPTION_WIDTH);
        assert_eq!(description(&None), "");
    }
}
