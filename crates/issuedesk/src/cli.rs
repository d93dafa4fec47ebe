//! Clap derive structures for the `issuedesk` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.
//! Only clap types appear here so build.rs can include the file.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// issuedesk -- hand out and take back video recorders
#[derive(Debug, Parser)]
#[command(
    name = "issuedesk",
    version,
    about = "Issue and return video recorders from the command line",
    long_about = "Client for the video recorder issuance service.\n\n\
        Every change is checked against a fresh copy of the server's state\n\
        before it is sent, and the state is fetched again afterwards.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "ISSUEDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL, e.g. http://host:5000/api (overrides profile)
    #[arg(long, env = "ISSUEDESK_SERVER", global = true)]
    pub server: Option<String>,

    /// Operator username (overrides profile)
    #[arg(long, short = 'u', env = "ISSUEDESK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ISSUEDESK_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "ISSUEDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ISSUEDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Log in and remember the session
    Login,

    /// Forget the stored session
    Logout,

    /// Show the logged-in operator
    Whoami,

    /// Register a new operator account
    Register(RegisterArgs),

    /// Manage employees
    #[command(alias = "emp", alias = "e")]
    Employees(EmployeesArgs),

    /// Manage video recorders
    #[command(alias = "rec", alias = "r")]
    Recorders(RecordersArgs),

    /// Hand a recorder to an employee
    Issue(IssuanceArgs),

    /// Take a recorder back from an employee
    Return(IssuanceArgs),

    /// List recorders currently out
    Active,

    /// Browse and clean up issuance history
    #[command(alias = "hist")]
    History(HistoryArgs),

    /// Check server state for issuance inconsistencies
    Audit,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Login name for the new account
    pub login: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub middle_name: String,

    /// Role id (1 = admin, 2 = operator)
    #[arg(long, default_value = "2")]
    pub role_id: i64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EMPLOYEES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EmployeesArgs {
    #[command(subcommand)]
    pub command: EmployeesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EmployeesCommand {
    /// List employees
    #[command(alias = "ls")]
    List {
        /// Case-insensitive match on name, position or personnel number
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only employees not holding a recorder
        #[arg(long)]
        unencumbered: bool,
    },

    /// Get employee details
    Get {
        /// Employee id or personnel number
        employee: String,
    },

    /// Add an employee
    Create {
        /// Full name
        #[arg(long)]
        name: String,

        #[arg(long)]
        position: Option<String>,

        /// Personnel number (up to 6 characters)
        #[arg(long)]
        number: String,
    },

    /// Change an employee
    Update {
        /// Employee id or personnel number
        employee: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        number: Option<String>,
    },

    /// Delete an employee
    #[command(alias = "rm")]
    Delete {
        /// Employee id or personnel number
        employee: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RECORDERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RecordersArgs {
    #[command(subcommand)]
    pub command: RecordersCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordersCommand {
    /// List video recorders
    #[command(alias = "ls")]
    List {
        /// Case-insensitive match on recorder number
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only recorders with this status (e.g. available, issued)
        #[arg(long, conflicts_with = "available")]
        status: Option<String>,

        /// Only recorders that can be issued right now
        #[arg(long)]
        available: bool,
    },

    /// Get recorder details
    Get {
        /// Recorder id or number
        recorder: String,
    },

    /// Add a recorder; new recorders start out available
    Create {
        /// Recorder number
        number: String,
    },

    /// Change a recorder
    Update {
        /// Recorder id or number
        recorder: String,

        #[arg(long)]
        number: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a recorder
    #[command(alias = "rm")]
    Delete {
        /// Recorder id or number
        recorder: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ISSUANCE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IssuanceArgs {
    /// Employee id or personnel number
    pub employee: String,

    /// Recorder id or number
    pub recorder: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

/// Filters shared by `history list` and `history purge`.
#[derive(Debug, Args)]
pub struct HistoryFilterArgs {
    /// Employee id or personnel number
    #[arg(long)]
    pub employee: Option<String>,

    /// Recorder id or number
    #[arg(long)]
    pub recorder: Option<String>,

    /// Issued on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Issued on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List issuance records, newest first as the server orders them
    #[command(alias = "ls")]
    List(HistoryFilterArgs),

    /// Delete issuance records by id
    #[command(alias = "rm")]
    Delete {
        /// Record ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete every record matching the filter, reporting each one
    Purge(HistoryFilterArgs),
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

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// server, username, password_env, insecure, timeout or ca_cert
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

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
