//! Clap derive structures for the `motorlog` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use motorlog_core::{DictionaryResource, EntityId, SocialProvider, StatisticsPeriod};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// motorlog -- your vehicles, reminders and service history from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "motorlog",
    version,
    about = "Track vehicle maintenance from the command line",
    long_about = "Command-line client for the motorlog vehicle-maintenance backend.\n\n\
        Reads fall back to the last copy saved on this machine when the backend\n\
        is unreachable; reference lists are cached for a day.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "MOTORLOG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long = "config", env = "MOTORLOG_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// API root including the version prefix (overrides profile)
    #[arg(long, env = "MOTORLOG_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Application key sent as X-API-Key
    #[arg(long, env = "MOTORLOG_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Directory holding the session, caches and offline copies
    #[arg(long, env = "MOTORLOG_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Language for reference lists (e.g. en, de)
    #[arg(long, env = "MOTORLOG_LOCALE", global = true)]
    pub locale: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MOTORLOG_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (development backends)
    #[arg(long, short = 'k', env = "MOTORLOG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MOTORLOG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Queue changes locally instead of sending them
    #[arg(long, global = true)]
    pub offline: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, sign out and guest mode
    Auth(AuthArgs),

    /// Show or edit the signed-in account
    Account(AccountArgs),

    /// Manage vehicles
    #[command(alias = "v")]
    Vehicles(VehiclesArgs),

    /// Manage maintenance reminders
    #[command(alias = "r")]
    Reminders(RemindersArgs),

    /// Service history records
    #[command(alias = "h")]
    History(HistoryArgs),

    /// Expenses and spending statistics
    #[command(alias = "e")]
    Expenses(ExpensesArgs),

    /// Find and bookmark service stations
    Stations(StationsArgs),

    /// Show a reference list (cached for a day)
    #[command(alias = "dict")]
    Dictionary(DictionaryArgs),

    /// Local copies and the queue of unsent changes
    Offline(OfflineArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long, env = "MOTORLOG_PASSWORD", hide_env = true)]
        password: Option<String>,
    },

    /// Create a new account and sign in
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Password (prompted twice when omitted)
        #[arg(long, env = "MOTORLOG_PASSWORD", hide_env = true)]
        password: Option<String>,
    },

    /// Sign in with a token from a third-party provider
    Social {
        /// google, apple or facebook
        provider: SocialProvider,

        /// Provider-issued token
        #[arg(long, env = "MOTORLOG_SOCIAL_TOKEN", hide_env = true)]
        token: String,
    },

    /// Sign out (local session is removed even if the backend is unreachable)
    Logout,

    /// Browse without an account; private data reads come back empty
    Guest {
        /// Leave guest mode instead of entering it
        #[arg(long)]
        off: bool,
    },

    /// Show session state
    Status,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Show the signed-in user
    Show,

    /// Update profile fields
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Preferred language (e.g. de)
        #[arg(long)]
        language: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VEHICLES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VehiclesArgs {
    #[command(subcommand)]
    pub command: VehiclesCommand,
}

#[derive(Debug, Subcommand)]
pub enum VehiclesCommand {
    /// List vehicles
    #[command(alias = "ls")]
    List,

    /// Show one vehicle
    Get { id: EntityId },

    /// Add a vehicle
    Add {
        #[arg(long)]
        brand: String,

        #[arg(long)]
        model: String,

        #[command(flatten)]
        details: VehicleDetails,
    },

    /// Change a vehicle; omitted fields keep their current value
    Update {
        id: EntityId,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[command(flatten)]
        details: VehicleDetails,
    },

    /// Delete a vehicle
    #[command(alias = "rm")]
    Delete { id: EntityId },
}

#[derive(Debug, Args)]
pub struct VehicleDetails {
    #[arg(long)]
    pub year: Option<u16>,

    #[arg(long)]
    pub vin: Option<String>,

    #[arg(long)]
    pub plate: Option<String>,

    /// Odometer reading
    #[arg(long)]
    pub mileage: Option<u32>,

    #[arg(long)]
    pub fuel: Option<String>,

    /// Body colour
    #[arg(long)]
    pub paint: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REMINDERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RemindersArgs {
    #[command(subcommand)]
    pub command: RemindersCommand,
}

#[derive(Debug, Subcommand)]
pub enum RemindersCommand {
    /// List reminders
    #[command(alias = "ls")]
    List {
        /// Only reminders for this vehicle
        #[arg(long)]
        vehicle: Option<EntityId>,

        /// Hide completed reminders
        #[arg(long)]
        open: bool,
    },

    /// Create a reminder
    Add {
        #[arg(long)]
        vehicle: EntityId,

        #[arg(long)]
        title: String,

        /// Reminder type id (see `motorlog dictionary reminder-types`)
        #[arg(long = "type")]
        reminder_type: Option<EntityId>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,

        #[arg(long)]
        due_mileage: Option<u32>,

        /// Repeat every N days
        #[arg(long)]
        repeat_days: Option<u32>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Mark a reminder as done
    Complete { id: EntityId },

    /// Delete a reminder
    #[command(alias = "rm")]
    Delete { id: EntityId },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVICE HISTORY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List service records
    #[command(alias = "ls")]
    List {
        /// Only records for this vehicle
        #[arg(long)]
        vehicle: Option<EntityId>,
    },

    /// Record a service
    Add {
        #[arg(long)]
        vehicle: EntityId,

        /// What was done (e.g. "oil change")
        #[arg(long = "type")]
        service_type: String,

        /// Service date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        mileage: Option<u32>,

        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        station: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a service record
    #[command(alias = "rm")]
    Delete { id: EntityId },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXPENSES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ExpensesArgs {
    #[command(subcommand)]
    pub command: ExpensesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ExpensesCommand {
    /// List expenses, one page at a time
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long)]
        vehicle: Option<EntityId>,
    },

    /// Record an expense
    Add {
        #[arg(long)]
        vehicle: EntityId,

        #[arg(long)]
        amount: f64,

        /// Expense type id (see `motorlog dictionary expense-types`)
        #[arg(long = "type")]
        expense_type: Option<EntityId>,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Spending totals
    Stats {
        #[arg(long)]
        vehicle: Option<EntityId>,

        /// month, quarter, year or all
        #[arg(long, default_value = "year")]
        period: StatisticsPeriod,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StationsArgs {
    #[command(subcommand)]
    pub command: StationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StationsCommand {
    /// Stations around a point
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Search radius in kilometres
        #[arg(long, default_value = "10")]
        radius: u32,
    },

    /// Bookmarked stations
    Saved,

    /// Bookmark a station
    Save { id: EntityId },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DICTIONARIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DictionaryArgs {
    pub resource: DictionaryKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DictionaryKind {
    ExpenseTypes,
    ReminderTypes,
    ManualSections,
    AdviceSections,
}

impl From<DictionaryKind> for DictionaryResource {
    fn from(kind: DictionaryKind) -> Self {
        match kind {
            DictionaryKind::ExpenseTypes => Self::ExpenseTypes,
            DictionaryKind::ReminderTypes => Self::ReminderTypes,
            DictionaryKind::ManualSections => Self::ManualSections,
            DictionaryKind::AdviceSections => Self::AdviceSections,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OFFLINE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OfflineArgs {
    #[command(subcommand)]
    pub command: OfflineCommand,
}

#[derive(Debug, Subcommand)]
pub enum OfflineCommand {
    /// Last sync time and queue size
    Status,

    /// Changes recorded while offline
    Pending,

    /// Discard one queued change
    Drop { id: Uuid },

    /// Remove every local copy and the queue
    Clear,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (base_url, api_key_env, locale, timeout, ...)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's application key in the system keyring
    SetKey,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
