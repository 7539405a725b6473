//! These structs provide the CLI interface for the expenses CLI.

use crate::config::OnCorrupt;
use crate::error::Error;
use crate::model::{Amount, Category, RecordId, RecordUpdates, YearMonth};
use crate::query::Query;
use crate::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for keeping track of personal expenses.
///
/// Each expense is a dated entry with a category, an amount and an optional note. Entries are kept
/// in a JSON ledger file in your expenses home directory. They can be listed grouped by date,
/// filtered by month or keyword, summarized per category and exported to CSV.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the expenses home directory and its configuration file.
    ///
    /// This is the first command you should run. By default the home directory is $HOME/expenses;
    /// pass --expenses-home or set EXPENSES_HOME to put it somewhere else.
    Init(InitArgs),
    /// Record a new expense.
    Add(AddArgs),
    /// Change one or more fields of an existing expense.
    Update(UpdateArgs),
    /// Delete an expense.
    Delete(IdArgs),
    /// Show a single expense.
    Show(IdArgs),
    /// List expenses, grouped by date.
    List(ListArgs),
    /// Show per-category totals along with today's and this month's spending.
    Summary(FilterArgs),
    /// Write expenses to a CSV file that spreadsheet programs can open.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// How many backup copies of the ledger file to keep.
    #[arg(long, default_value_t = 5)]
    backup_copies: u32,

    /// Where to keep the ledger file, relative to the expenses home or absolute. Defaults to
    /// records.json in the expenses home.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// What to do when the ledger file cannot be read.
    #[arg(long, value_enum, default_value_t = OnCorrupt::Abort)]
    on_corrupt: OnCorrupt,
}

impl InitArgs {
    pub fn new(backup_copies: u32, data_file: Option<PathBuf>, on_corrupt: OnCorrupt) -> Self {
        Self {
            backup_copies,
            data_file,
            on_corrupt,
        }
    }

    pub fn backup_copies(&self) -> u32 {
        self.backup_copies
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    pub fn on_corrupt(&self) -> OnCorrupt {
        self.on_corrupt
    }
}

/// Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The date of the expense, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The category of the expense.
    #[arg(long, value_enum)]
    category: Category,

    /// The amount spent. Must be greater than zero. A leading $ and thousands separators are
    /// accepted, e.g. $1,250.50
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// A free-text note.
    #[arg(long, default_value = "")]
    note: String,
}

impl AddArgs {
    pub fn new(
        date: Option<NaiveDate>,
        category: Category,
        amount: Amount,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            category,
            amount,
            note: note.into(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// Args for the `expenses update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the expense to change.
    id: RecordId,

    /// The new date, YYYY-MM-DD.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The new category.
    #[arg(long, value_enum)]
    category: Option<Category>,

    /// The new amount. Must be greater than zero.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<Amount>,

    /// The new note. Pass an empty string to clear it.
    #[arg(long)]
    note: Option<String>,
}

impl UpdateArgs {
    pub fn new(id: RecordId, updates: RecordUpdates) -> Self {
        Self {
            id,
            date: updates.date,
            category: updates.category,
            amount: updates.amount,
            note: updates.note,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The fields to change. Fields that were not given are `None`.
    pub fn updates(&self) -> RecordUpdates {
        RecordUpdates {
            date: self.date,
            category: self.category,
            amount: self.amount,
            note: self.note.clone(),
        }
    }
}

/// Args for commands that address one expense by id.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The id of the expense, as shown by `expenses list`.
    id: RecordId,
}

impl IdArgs {
    pub fn new(id: RecordId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
}

/// Filters shared by the commands that read expenses.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Only include expenses from this month, YYYY-MM. Empty means every month.
    #[arg(long, default_value = "")]
    month: String,

    /// Only include expenses whose category or note contains this text, ignoring case.
    #[arg(long, default_value = "")]
    keyword: String,
}

impl FilterArgs {
    pub fn new(month: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            keyword: keyword.into(),
        }
    }

    /// Parses the month filter.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the month is not blank and not `YYYY-MM`.
    pub fn month(&self) -> Result<Option<YearMonth>> {
        YearMonth::parse_optional(&self.month).map_err(Error::validation)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Builds the query these filters describe.
    pub fn query(&self, ascending: bool) -> Result<Query> {
        Ok(Query {
            month: self.month()?,
            keyword: self.keyword.clone(),
            ascending,
        })
    }
}

/// Args for the `expenses list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    #[clap(flatten)]
    filter: FilterArgs,

    /// List the newest expenses first.
    #[arg(long)]
    descending: bool,
}

impl ListArgs {
    pub fn new(filter: FilterArgs, descending: bool) -> Self {
        Self { filter, descending }
    }

    pub fn query(&self) -> Result<Query> {
        self.filter.query(!self.descending)
    }
}

/// Args for the `expenses export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The file to write. An existing file is replaced.
    #[arg(long, short)]
    output: PathBuf,

    #[clap(flatten)]
    list: ListArgs,
}

impl ExportArgs {
    pub fn new(output: impl Into<PathBuf>, list: ListArgs) -> Self {
        Self {
            output: output.into(),
            list,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn query(&self) -> Result<Query> {
        self.list.query()
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default expenses home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("expenses").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_add() {
        let args = parse(&[
            "--expenses-home",
            "/tmp/x",
            "add",
            "--date",
            "2024-01-05",
            "--category",
            "food",
            "--amount",
            "$1,250.50",
            "--note",
            "dinner",
        ]);
        assert_eq!(args.common().expenses_home().path(), Path::new("/tmp/x"));
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(add.category(), Category::Food);
        assert_eq!(add.amount().to_string(), "1250.50");
        assert_eq!(add.note(), "dinner");
    }

    #[test]
    fn test_parse_add_rejects_bad_date() {
        let result = Args::try_parse_from([
            "expenses",
            "add",
            "--date",
            "05/01/2024",
            "--category",
            "food",
            "--amount",
            "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_update_partial() {
        let args = parse(&["update", "7", "--amount", "80"]);
        let Command::Update(update) = args.command() else {
            panic!("expected update, got {:?}", args.command());
        };
        assert_eq!(update.id(), RecordId::new(7));
        let updates = update.updates();
        assert_eq!(updates.amount, Some(Amount::from(80)));
        assert!(updates.date.is_none());
        assert!(updates.category.is_none());
        assert!(updates.note.is_none());
    }

    #[test]
    fn test_parse_list_filters() {
        let args = parse(&["list", "--month", "2024-01", "--keyword", "bus", "--descending"]);
        let Command::List(list) = args.command() else {
            panic!("expected list, got {:?}", args.command());
        };
        let query = list.query().unwrap();
        assert_eq!(query.month, YearMonth::new(2024, 1));
        assert_eq!(query.keyword, "bus");
        assert!(!query.ascending);
    }

    #[test]
    fn test_blank_month_is_no_filter() {
        let query = ListArgs::default().query().unwrap();
        assert_eq!(query, Query::default());
    }

    #[test]
    fn test_bad_month_is_validation_error() {
        let err = FilterArgs::new("2024-13", "").month().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[test]
    fn test_parse_init_defaults() {
        let args = parse(&["init"]);
        let Command::Init(init) = args.command() else {
            panic!("expected init, got {:?}", args.command());
        };
        assert_eq!(init.backup_copies(), 5);
        assert!(init.data_file().is_none());
        assert_eq!(init.on_corrupt(), OnCorrupt::Abort);

        let args = parse(&["init", "--on-corrupt", "start_empty"]);
        let Command::Init(init) = args.command() else {
            panic!("expected init, got {:?}", args.command());
        };
        assert_eq!(init.on_corrupt(), OnCorrupt::StartEmpty);
    }
}
