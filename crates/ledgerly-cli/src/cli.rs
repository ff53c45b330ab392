use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use ledgerly_core::models::{ReportFilter, DEFAULT_RECENT_LIMIT};

#[derive(Debug, Parser)]
#[command(name = "ledgerly", version, about = "Personal finance tracker client")]
pub struct Cli {
    /// Backend base URL (overrides LEDGERLY_API_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session credentials
    Login { username: Option<String> },
    /// Create a user and log in
    Register { username: Option<String> },
    /// Forget the stored session credentials
    Logout,
    /// Show whether a session is stored
    Status,
    /// Manage accounts
    #[command(subcommand)]
    Accounts(NamedAction),
    /// Manage categories
    #[command(subcommand)]
    Categories(NamedAction),
    /// Manage expenses
    #[command(subcommand)]
    Expenses(ExpenseAction),
    /// Manage incomes
    #[command(subcommand)]
    Incomes(IncomeAction),
    /// Manage transfers between accounts
    #[command(subcommand)]
    Transfers(TransferAction),
    /// Totals and account balances
    Summary,
    /// Income, expense and net per month
    Cashflow(FilterArgs),
    /// Expense totals per category
    ByCategory(FilterArgs),
    /// Latest expenses, incomes and transfers
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Show or change the display theme
    Theme { mode: Option<ThemeChoice> },
}

impl Command {
    /// Everything except session management and local preferences needs a
    /// stored access credential.
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. }
                | Command::Register { .. }
                | Command::Logout
                | Command::Status
                | Command::Theme { .. }
        )
    }
}

/// Actions for resources that only have a name.
#[derive(Debug, Subcommand)]
pub enum NamedAction {
    List,
    Add { name: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseAction {
    List,
    Add(ExpenseArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        args: ExpenseArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct ExpenseArgs {
    #[arg(long)]
    pub amount: Decimal,
    /// Category id
    #[arg(long)]
    pub category: i64,
    /// Account id
    #[arg(long)]
    pub account: i64,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Subcommand)]
pub enum IncomeAction {
    List,
    Add(IncomeArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        args: IncomeArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct IncomeArgs {
    #[arg(long)]
    pub amount: Decimal,
    /// Account id
    #[arg(long)]
    pub account: i64,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Subcommand)]
pub enum TransferAction {
    List,
    Add(TransferArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        args: TransferArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Source account id
    #[arg(long)]
    pub from: i64,
    /// Destination account id
    #[arg(long)]
    pub to: i64,
    #[arg(long)]
    pub amount: Decimal,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Restrict to one account id
    #[arg(long)]
    pub account: Option<i64>,
}

impl From<FilterArgs> for ReportFilter {
    fn from(args: FilterArgs) -> Self {
        ReportFilter {
            start: args.start,
            end: args.end,
            account: args.account,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}
