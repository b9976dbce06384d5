//! Clap derive structures for the `devconfig` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of workspace types so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// devconfig -- compare field devices against their stored configuration
#[derive(Debug, Parser)]
#[command(
    name = "devconfig",
    version,
    about = "Compare live device settings against the configuration store",
    long_about = "Reads the live settings of field devices through a control-point\n\
        gateway (or a snapshot file), compares devices with each other or with\n\
        their stored configuration, and prints the fields that disagree.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "DEVCONFIG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Control-point gateway URL (overrides profile)
    #[arg(long, env = "DEVCONFIG_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Configuration store URL (overrides profile)
    #[arg(long, env = "DEVCONFIG_STORE", global = true)]
    pub store: Option<String>,

    /// Bearer token for the gateway and store
    #[arg(long, env = "DEVCONFIG_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Local dataset directory (catalog.toml + schemas/)
    #[arg(long, env = "DEVCONFIG_CATALOG_DIR", global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Use the local dataset instead of the store's catalog
    #[arg(long, short = 'L', global = true)]
    pub local: bool,

    /// Read control points from a JSON snapshot instead of the gateway
    #[arg(long, env = "DEVCONFIG_POINTS_FILE", global = true)]
    pub points_file: Option<PathBuf>,

    /// Read stored records from a JSON dump instead of the store
    #[arg(long, env = "DEVCONFIG_STORE_FILE", global = true)]
    pub store_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DEVCONFIG_OUTPUT",
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

    /// Never prompt; fail where a choice would be needed
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DEVCONFIG_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-read timeout in seconds (overrides profile)
    #[arg(long, env = "DEVCONFIG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text report or pretty table (default)
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
    /// Compare devices with each other or with the configuration store
    #[command(alias = "d")]
    Diff(DiffArgs),

    /// Show the live or stored settings of one device
    #[command(alias = "v")]
    View(ViewArgs),

    /// List zones and their aliases
    Zones(ZonesArgs),

    /// List device types
    Types,

    /// List the fields of a device type
    Fields(FieldsArgs),

    /// Reload the catalog and report schemas that failed to load
    Refresh,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Diff / View ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Base control-point addresses of the devices to compare
    #[arg(required = true, num_args = 1..)]
    pub addresses: Vec<String>,

    /// Restrict type inference to these zones or aliases
    #[arg(long, short = 'z', value_delimiter = ',')]
    pub zone: Vec<String>,

    /// Restrict type inference to these device types
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub device_type: Vec<String>,

    /// Also compare every device against its stored record
    #[arg(long)]
    pub pmgr: bool,

    /// Add a column with each field's description
    #[arg(long)]
    pub tooltip: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["address", "id"])))]
pub struct ViewArgs {
    /// Base control-point address of a live device
    pub address: Option<String>,

    /// Identity value of a stored device (needs --type)
    #[arg(long, requires = "device_type")]
    pub id: Option<String>,

    /// Device type (restricts inference for an address)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub device_type: Vec<String>,

    /// Restrict type inference to these zones or aliases
    #[arg(long, short = 'z', value_delimiter = ',')]
    pub zone: Vec<String>,

    /// Only the type's summary fields
    #[arg(long, short = 's')]
    pub summary: bool,

    /// Add a column with each field's description
    #[arg(long)]
    pub tooltip: bool,
}

// ── Catalog listings ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ZonesArgs {
    /// List aliases and the zones they expand to instead
    #[arg(long, short = 'a')]
    pub aliases: bool,
}

#[derive(Debug, Args)]
pub struct FieldsArgs {
    /// Device type name
    pub device_type: String,

    /// Which fields to list
    #[arg(long, default_value = "all")]
    pub scope: ScopeFilter,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeFilter {
    /// Every field in schema order
    All,
    /// Fields of the physical device record
    Object,
    /// Fields of the logical configuration record
    Config,
    /// The type's summary fields
    Summary,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (token redacted)
    Show,

    /// Print the config file path
    Path,

    /// Set a profile value
    Set {
        /// Profile key (e.g., "gateway", "catalog_dir", "strict_store")
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

    /// Store a bearer token for the active profile in the system keyring
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
