//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::Overrides;
use crate::record::{parse_date, DeviceCategory, DeviceDraft};

/// Device inventory - track the devices you own and what they cost.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "inv", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "INV_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Inventory data file
    #[arg(long, global = true, env = "INV_DATA_FILE", value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Configuration file (.toml, .yaml or .yml)
    #[arg(long, global = true, env = "INV_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Exchange-rate endpoint; the base currency is appended to it
    #[arg(long, global = true, env = "INV_RATE_ENDPOINT", value_name = "URL", hide_short_help = true)]
    pub rate_endpoint: Option<String>,

    /// Currency prices are recorded in
    #[arg(long, global = true, env = "INV_BASE_CURRENCY", value_name = "CODE", hide_short_help = true)]
    pub base_currency: Option<String>,

    /// Currency totals are converted into
    #[arg(long, global = true, env = "INV_TARGET_CURRENCY", value_name = "CODE", hide_short_help = true)]
    pub target_currency: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }

    /// Settings overrides carried by global flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            data_file: self.data_file.clone(),
            endpoint: self.rate_endpoint.clone(),
            base: self.base_currency.clone(),
            target: self.target_currency.clone(),
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Browsing ===
    /// List devices in inventory order
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one device
    Show(ShowArgs),

    // === Editing ===
    /// Add a device
    Add(AddArgs),

    /// Change fields of a device
    Edit(EditArgs),

    /// Remove one or more devices
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),

    /// Move a device to another position
    #[command(name = "move", visible_alias = "mv")]
    Move(MoveArgs),

    // === Cost ===
    /// Show the total purchase cost, optionally converted
    Total(TotalArgs),

    // === Reference ===
    /// List device categories and suggested models
    Categories,

    /// Show the effective configuration
    Config(ConfigArgs),

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show every field
    #[arg(long, short = 'l')]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// List position, full id, or id prefix (at least 4 characters)
    pub selector: String,
}

/// Record fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Purchase date (YYYY-MM-DD or "today")
    #[arg(long, short = 'd', value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Purchase price, as written
    #[arg(long, short = 'p', allow_hyphen_values = true)]
    pub price: Option<String>,

    /// Serial number
    #[arg(long, short = 's')]
    pub serial: Option<String>,

    /// Category (see `inv categories`)
    #[arg(long, short = 'c', value_parser = parse_category_arg)]
    pub category: Option<DeviceCategory>,

    /// Model; defaults to the category's first suggestion for new devices
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Photo URL (http or https)
    #[arg(long, value_name = "URL")]
    pub image_url: Option<String>,
}

impl FieldArgs {
    /// Build a draft with the given name override.
    #[must_use]
    pub fn to_draft(&self, name: Option<String>) -> DeviceDraft {
        DeviceDraft {
            device_name: name,
            purchase_date: self.date,
            purchase_price: self.price.clone(),
            serial_number: self.serial.clone(),
            device_category: self.category,
            model: self.model.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Device name
    pub name: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// List position, full id, or id prefix
    pub selector: String,

    /// New device name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Devices to remove (positions, ids, or id prefixes)
    #[arg(required = true, num_args = 1..)]
    pub selectors: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Device to move (position, id, or id prefix)
    pub from: String,

    /// Target position; larger values move to the end
    pub to: usize,
}

#[derive(Args, Debug)]
pub struct TotalArgs {
    /// Convert the total using the exchange-rate endpoint
    #[arg(long, short = 'c')]
    pub convert: bool,

    /// Convert into this currency instead of the configured one (implies --convert)
    #[arg(long, short = 't', value_name = "CODE")]
    pub target: Option<String>,
}

impl TotalArgs {
    #[must_use]
    pub const fn wants_conversion(&self) -> bool {
        self.convert || self.target.is_some()
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show configuration file path only
    #[arg(long)]
    pub path: bool,

    /// Write a default configuration file (to --config, or the usual location)
    #[arg(long, conflicts_with = "path")]
    pub init: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn parse_category_arg(value: &str) -> Result<DeviceCategory, String> {
    value.parse::<DeviceCategory>().map_err(|e| e.to_string())
}
