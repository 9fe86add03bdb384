//! Clap derive structures for the `adxview` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use adxview_core::{Platform, RangePreset};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// adxview -- ad exchange reporting from the command line
#[derive(Debug, Parser)]
#[command(
    name = "adxview",
    version,
    about = "Query ad exchange traffic reports from the command line",
    long_about = "A CLI client for ad exchange reporting backends.\n\n\
        Fetches platform statistics, content health and video health\n\
        reports over named date ranges, with summaries, chart series\n\
        and CSV export.",
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
    #[arg(long, short = 'p', env = "ADXVIEW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "ADXVIEW_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Username for password auth
    #[arg(long, short = 'u', env = "ADXVIEW_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ADXVIEW_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ADXVIEW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ADXVIEW_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
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
    /// Tab-separated values, one row per line (scripting)
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
    /// Cross-report dashboard summary
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Platform request statistics
    #[command(alias = "plat")]
    Platform(PlatformArgs),

    /// Content object health by platform
    Content(SegmentedArgs),

    /// Video object health by platform
    Video(SegmentedArgs),

    /// List date range presets and their current resolution
    Presets,

    /// Authenticate and store a session token
    Login(LoginArgs),

    /// Revoke and discard the stored session token
    Logout,

    /// Show the authenticated user
    Whoami,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Report Arguments ──────────────────────────────────────────

fn parse_preset(s: &str) -> Result<RangePreset, String> {
    s.parse().map_err(|_| {
        format!(
            "unknown preset '{s}' (expected one of: today, yesterday, \
             last7Days, last30Days, thisWeek, thisMonth)"
        )
    })
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
        .map_err(|_| format!("unknown platform '{s}' (expected one of: CTV, Audio, Display, App)"))
}

/// Date range selection, shared by all report commands.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Named date range preset (default: last7Days)
    #[arg(long, short = 'r', value_parser = parse_preset, conflicts_with_all = ["start", "end"])]
    pub range: Option<RangePreset>,

    /// Range start (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,
}

/// Output selection, shared by all report commands.
#[derive(Debug, Args)]
pub struct ReportViewArgs {
    /// Show aggregated totals instead of rows
    #[arg(long, short = 's')]
    pub summary: bool,

    /// Emit chart series (per-day values, JSON)
    #[arg(long, conflicts_with = "summary")]
    pub chart: bool,

    /// Write rows to a CSV file (derives a file name when omitted)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "")]
    pub export: Option<PathBuf>,

    /// Keep running and re-render as data refreshes
    #[arg(long, short = 'w', conflicts_with = "export")]
    pub watch: bool,

    /// Seconds between refreshes in watch mode
    #[arg(long, default_value = "30")]
    pub refresh: u64,
}

#[derive(Debug, Args)]
pub struct PlatformArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub view: ReportViewArgs,
}

/// Arguments for reports segmented by platform.
#[derive(Debug, Args)]
pub struct SegmentedArgs {
    /// Platform segment
    #[arg(long, short = 'P', default_value = "CTV", value_parser = parse_platform)]
    pub platform: Platform,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub view: ReportViewArgs,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Keep running and re-render as data refreshes
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Seconds between refreshes in watch mode
    #[arg(long, default_value = "30")]
    pub refresh: u64,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username to authenticate as (prompts for the password)
    pub username: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// List configured profiles
    List,

    /// Create or update a profile
    Init {
        /// Profile name
        #[arg(default_value = "default")]
        name: String,

        /// Backend base URL
        #[arg(long)]
        backend: String,

        /// Username for password auth
        #[arg(long)]
        username: Option<String>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
