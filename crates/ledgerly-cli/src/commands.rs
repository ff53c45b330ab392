//! Command handlers. Each handler is a thin consumer of `ApiClient`.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::warn;

use ledgerly_core::config::Theme;
use ledgerly_core::models::{NewExpense, NewIncome, NewTransfer, ReportFilter};
use ledgerly_core::utils::format_currency;
use ledgerly_core::{ApiClient, ApiError, Config};

use crate::cli::{
    Command, ExpenseAction, ExpenseArgs, IncomeAction, IncomeArgs, NamedAction, ThemeChoice,
    TransferAction, TransferArgs,
};
use crate::output;

/// Environment variable consulted before prompting for a password
const PASSWORD_ENV: &str = "LEDGERLY_PASSWORD";

pub async fn run(api: &ApiClient, config: &mut Config, command: Command, json: bool) -> Result<()> {
    if command.needs_session() {
        require_login(api)?;
    }

    match command {
        Command::Login { username } => login(api, config, username).await,
        Command::Register { username } => register(api, config, username).await,
        Command::Logout => {
            api.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            if api.session().is_authenticated() {
                match config.last_username {
                    Some(ref name) => println!("Logged in as {}.", name),
                    None => println!("Logged in."),
                }
            } else {
                println!("Not logged in.");
            }
            Ok(())
        }
        Command::Theme { mode } => theme(config, mode),
        Command::Accounts(action) => accounts(api, action, json).await,
        Command::Categories(action) => categories(api, action, json).await,
        Command::Expenses(action) => expenses(api, action, json).await,
        Command::Incomes(action) => incomes(api, action, json).await,
        Command::Transfers(action) => transfers(api, action, json).await,
        Command::Summary => {
            let summary = api.summary().await?;
            output::summary(&summary, json)
        }
        Command::Cashflow(args) => {
            let rows = api.monthly_cashflow(&ReportFilter::from(args)).await?;
            output::cashflow(&rows, json)
        }
        Command::ByCategory(args) => {
            let rows = api.totals_by_category(&ReportFilter::from(args)).await?;
            output::category_totals(&rows, json)
        }
        Command::Recent { limit } => {
            let entries = api.recent_activity(limit).await?;
            output::activity(&entries, json)
        }
    }
}

fn require_login(api: &ApiClient) -> Result<()> {
    if !api.session().is_authenticated() {
        bail!("Not logged in. Run `ledgerly login` first.");
    }
    Ok(())
}

// ===== Session =====

async fn login(api: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = resolve_username(username, config.last_username.as_deref())?;
    let password = read_password()?;

    if let Err(e) = api.login(&username, &password).await {
        if is_unauthorized(&e) {
            bail!("Invalid username or password");
        }
        return Err(e);
    }

    remember_username(config, &username);
    println!("Logged in as {}.", username);
    Ok(())
}

async fn register(api: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = resolve_username(username, None)?;
    let password = read_password()?;

    if let Err(e) = api.register(&username, &password).await {
        if e.downcast_ref::<ApiError>().is_some() {
            return Err(e.context("Registration failed. Try another username."));
        }
        return Err(e);
    }

    remember_username(config, &username);
    println!("Registered and logged in as {}.", username);
    Ok(())
}

fn resolve_username(given: Option<String>, last: Option<&str>) -> Result<String> {
    if let Some(name) = given.filter(|n| !n.trim().is_empty()) {
        return Ok(name.trim().to_string());
    }

    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read username")?;
    let entered = line.trim();

    match (entered.is_empty(), last) {
        (false, _) => Ok(entered.to_string()),
        (true, Some(last)) => Ok(last.to_string()),
        (true, None) => bail!("Username required"),
    }
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        if !password.is_empty() {
            return Ok(password);
        }
    }
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    if password.is_empty() {
        bail!("Password required");
    }
    Ok(password)
}

fn remember_username(config: &mut Config, username: &str) {
    config.last_username = Some(username.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .map(ApiError::is_unauthorized)
        .unwrap_or(false)
}

// ===== Theme =====

pub fn theme(config: &mut Config, mode: Option<ThemeChoice>) -> Result<()> {
    let next = match mode {
        None => {
            println!("Theme: {}", config.theme);
            return Ok(());
        }
        Some(ThemeChoice::Light) => Theme::Light,
        Some(ThemeChoice::Dark) => Theme::Dark,
        Some(ThemeChoice::Toggle) => config.theme.toggle(),
    };
    config.theme = next;
    config.save()?;
    println!("Theme: {}", next);
    Ok(())
}

// ===== Resources =====

async fn accounts(api: &ApiClient, action: NamedAction, json: bool) -> Result<()> {
    match action {
        NamedAction::List => output::accounts(&api.list_accounts().await?, json),
        NamedAction::Add { name } => {
            let account = api.create_account(&name).await?;
            println!("Added account {} ({}).", account.name, account.id);
            Ok(())
        }
        NamedAction::Rename { id, name } => {
            let account = api.update_account(id, &name).await?;
            println!("Renamed account {} to {}.", account.id, account.name);
            Ok(())
        }
        NamedAction::Delete { id } => {
            api.delete_account(id).await?;
            println!("Deleted account {}.", id);
            Ok(())
        }
    }
}

async fn categories(api: &ApiClient, action: NamedAction, json: bool) -> Result<()> {
    match action {
        NamedAction::List => output::categories(&api.list_categories().await?, json),
        NamedAction::Add { name } => {
            let category = api.create_category(&name).await?;
            println!("Added category {} ({}).", category.name, category.id);
            Ok(())
        }
        NamedAction::Rename { id, name } => {
            let category = api.update_category(id, &name).await?;
            println!("Renamed category {} to {}.", category.id, category.name);
            Ok(())
        }
        NamedAction::Delete { id } => {
            if let Err(e) = api.delete_category(id).await {
                let in_use = e
                    .downcast_ref::<ApiError>()
                    .map(ApiError::is_server_error)
                    .unwrap_or(false);
                if in_use {
                    bail!("Cannot delete this category because it has expenses linked to it.");
                }
                return Err(e);
            }
            println!("Deleted category {}.", id);
            Ok(())
        }
    }
}

async fn expenses(api: &ApiClient, action: ExpenseAction, json: bool) -> Result<()> {
    match action {
        ExpenseAction::List => {
            let (expenses, categories, accounts) = futures::try_join!(
                api.list_expenses(),
                api.list_categories(),
                api.list_accounts(),
            )?;
            output::expenses(&expenses, &categories, &accounts, json)
        }
        ExpenseAction::Add(args) => {
            let expense = api.create_expense(&new_expense(args)).await?;
            println!("Added expense {}.", expense.id);
            Ok(())
        }
        ExpenseAction::Edit { id, args } => {
            api.update_expense(id, &new_expense(args)).await?;
            println!("Updated expense {}.", id);
            Ok(())
        }
        ExpenseAction::Delete { id } => {
            api.delete_expense(id).await?;
            println!("Deleted expense {}.", id);
            Ok(())
        }
    }
}

fn new_expense(args: ExpenseArgs) -> NewExpense {
    NewExpense {
        amount: args.amount,
        category: args.category,
        account: args.account,
        description: args.description,
    }
}

async fn incomes(api: &ApiClient, action: IncomeAction, json: bool) -> Result<()> {
    match action {
        IncomeAction::List => {
            let (incomes, accounts) = futures::try_join!(api.list_incomes(), api.list_accounts())?;
            output::incomes(&incomes, &accounts, json)
        }
        IncomeAction::Add(args) => {
            let income = api.create_income(&new_income(args)).await?;
            println!("Added income {}.", income.id);
            Ok(())
        }
        IncomeAction::Edit { id, args } => {
            api.update_income(id, &new_income(args)).await?;
            println!("Updated income {}.", id);
            Ok(())
        }
        IncomeAction::Delete { id } => {
            api.delete_income(id).await?;
            println!("Deleted income {}.", id);
            Ok(())
        }
    }
}

fn new_income(args: IncomeArgs) -> NewIncome {
    NewIncome {
        amount: args.amount,
        account: args.account,
        description: args.description,
    }
}

async fn transfers(api: &ApiClient, action: TransferAction, json: bool) -> Result<()> {
    match action {
        TransferAction::List => {
            let (transfers, accounts) =
                futures::try_join!(api.list_transfers(), api.list_accounts())?;
            output::transfers(&transfers, &accounts, json)
        }
        TransferAction::Add(args) => {
            let transfer = checked_transfer(args)?;
            if let Err(e) = api.create_transfer(&transfer).await {
                return Err(e.context("Failed to add transfer. Make sure accounts are different and valid."));
            }
            println!(
                "Transferred {} from account {} to account {}.",
                format_currency(transfer.amount),
                transfer.from_account,
                transfer.to_account
            );
            Ok(())
        }
        TransferAction::Edit { id, args } => {
            let transfer = checked_transfer(args)?;
            api.update_transfer(id, &transfer).await?;
            println!("Updated transfer {}.", id);
            Ok(())
        }
        TransferAction::Delete { id } => {
            api.delete_transfer(id).await?;
            println!("Deleted transfer {}.", id);
            Ok(())
        }
    }
}

fn checked_transfer(args: TransferArgs) -> Result<NewTransfer> {
    let transfer = NewTransfer {
        from_account: args.from,
        to_account: args.to,
        amount: args.amount,
    };
    if !transfer.is_valid() {
        bail!("A transfer needs two different accounts and a positive amount.");
    }
    Ok(transfer)
}
