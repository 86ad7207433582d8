//! Device inventory CLI - track owned devices and what they cost.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use console::style;
use serde::Serialize;
use tracing::{debug, info, warn};

use inv::cli::{self, Cli, Commands};
use inv::config::{default_config_dir, save_config, AppConfig, Settings, CONFIG_FILE_NAMES};
use inv::cost::CostSummary;
use inv::currency::{HttpRateSource, RateLookup, RateSource};
use inv::error::{InvError, Result};
use inv::logging::init_logging;
use inv::output::{Output, OutputMode, VersionInfo};
use inv::record::DeviceCategory;
use inv::store::{DeviceStore, LoadOutcome};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> bool {
        matches!(option_env!("VERGEN_GIT_DIRTY"), Some("true"))
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    if let Err(e) = init_logging(cli.use_json(), cli.verbose, cli.quiet) {
        debug!(error = %e, "Keeping existing log subscriber");
    }

    let output = OutputMode::from_cli(&cli).into_output();
    match run(&cli, output.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            output.error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, out: &dyn Output) -> Result<()> {
    let Some(command) = &cli.command else {
        print_quick_start(cli);
        return Ok(());
    };

    match command {
        Commands::List(args) => cmd_list(cli, out, args).await,
        Commands::Show(args) => cmd_show(cli, out, args).await,
        Commands::Add(args) => cmd_add(cli, out, args).await,
        Commands::Edit(args) => cmd_edit(cli, out, args).await,
        Commands::Remove(args) => cmd_remove(cli, out, args).await,
        Commands::Move(args) => cmd_move(cli, out, args).await,
        Commands::Total(args) => cmd_total(cli, out, args).await,
        Commands::Categories => {
            out.categories(&DeviceCategory::ALL);
            Ok(())
        }
        Commands::Config(args) => cmd_config(cli, out, args),
        Commands::Version => {
            out.version_info(&version_info());
            Ok(())
        }
        Commands::Completions(args) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "inv", &mut io::stdout());
            Ok(())
        }
    }
}

// === Quick Start (Robot Mode Optimized) ===

fn print_quick_start(cli: &Cli) {
    if cli.use_json() {
        print_robot_quick_start();
    } else {
        print_human_quick_start();
    }
}

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    browse: RobotBrowse,
    edit: RobotEdit,
    cost: RobotCost,
    selectors: &'static str,
    output_modes: OutputModes,
}

#[derive(Serialize)]
struct RobotBrowse {
    list_devices: &'static str,
    show_device: &'static str,
    categories: &'static str,
}

#[derive(Serialize)]
struct RobotEdit {
    add_device: &'static str,
    edit_device: &'static str,
    remove_devices: &'static str,
    move_device: &'static str,
}

#[derive(Serialize)]
struct RobotCost {
    total: &'static str,
    converted_total: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

fn print_robot_quick_start() {
    let help = RobotQuickStart {
        tool: "inv",
        version: build_info::VERSION,
        description: "Personal device inventory with purchase cost totals",
        browse: RobotBrowse {
            list_devices: "inv list --robot",
            show_device: "inv show <SELECTOR> --robot",
            categories: "inv categories --robot",
        },
        edit: RobotEdit {
            add_device: "inv add <NAME> --price <PRICE> --category <CATEGORY> --robot",
            edit_device: "inv edit <SELECTOR> --price <PRICE> --robot",
            remove_devices: "inv remove <SELECTOR>... --robot",
            move_device: "inv move <SELECTOR> <POSITION> --robot",
        },
        cost: RobotCost {
            total: "inv total --robot",
            converted_total: "inv total --convert --target USD --robot",
        },
        selectors: "A list position (0-based), a full id, or an id prefix of at least 4 characters",
        output_modes: OutputModes {
            human: "--format=text (default)",
            robot: "--robot or --format=json",
            compact: "--format=json-compact",
        },
    };

    match serde_json::to_string_pretty(&help) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Could not serialize quick start"),
    }
}

fn print_human_quick_start() {
    println!(
        "{} {} - device inventory\n",
        style("inv").bold().cyan(),
        build_info::VERSION
    );

    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  Add a device", style("inv add \"MacBook Air\" -c laptop -p 1199").green());
    println!("  {}  List devices", style("inv list").green());
    println!("  {}  Show one device", style("inv show 0").green());
    println!("  {}  Change a field", style("inv edit 0 --price 1099").green());
    println!("  {}  Move to the top", style("inv move 3 0").green());
    println!("  {}  Remove devices", style("inv remove 1 2").green());
    println!("  {}  Total cost", style("inv total").green());
    println!("  {}  Total in USD", style("inv total --convert").green());
    println!();

    println!("{}", style("ROBOT MODE (for agents)").bold().underlined());
    println!();
    println!("  {}  JSON output", style("inv --robot <command>").cyan());
    println!("  {}  Quick-start JSON", style("inv --robot").cyan());
    println!();

    println!("Run {} for full help", style("inv --help").yellow());
}

// === Command Implementations ===

/// Resolve settings and load the store.
async fn open_store(cli: &Cli) -> Result<(Settings, DeviceStore)> {
    let settings = Settings::resolve(&cli.overrides())?;
    let store = DeviceStore::new(&settings.data_file);
    match store.load_outcome().await {
        LoadOutcome::Loaded(collection) => debug!(count = collection.len(), "Inventory loaded"),
        LoadOutcome::Missing => debug!("No inventory yet"),
        LoadOutcome::Unreadable { reason } | LoadOutcome::Corrupt { reason } => {
            warn!(%reason, path = %store.path().display(), "Starting from an empty inventory");
        }
    }
    Ok((settings, store))
}

async fn cmd_list(cli: &Cli, out: &dyn Output, args: &cli::ListArgs) -> Result<()> {
    let (_, store) = open_store(cli).await?;
    out.device_list(store.snapshot().as_slice(), args.long);
    Ok(())
}

async fn cmd_show(cli: &Cli, out: &dyn Output, args: &cli::ShowArgs) -> Result<()> {
    let (_, store) = open_store(cli).await?;
    let (position, device) = store.resolve(&args.selector)?;
    out.device_detail(position, &device);
    Ok(())
}

async fn cmd_add(cli: &Cli, out: &dyn Output, args: &cli::AddArgs) -> Result<()> {
    let (_, store) = open_store(cli).await?;
    let device = args.fields.to_draft(Some(args.name.clone())).apply(None);

    let outcome = store.upsert(device.clone());
    store.save().await?;
    info!(id = %device.id, "Device added");
    out.device_saved(outcome, &device);
    Ok(())
}

async fn cmd_edit(cli: &Cli, out: &dyn Output, args: &cli::EditArgs) -> Result<()> {
    let (_, store) = open_store(cli).await?;
    let (_, existing) = store.resolve(&args.selector)?;

    let draft = args.fields.to_draft(args.name.clone());
    if draft.is_empty() {
        out.info("Nothing to change");
        return Ok(());
    }

    let device = draft.apply(Some(&existing));
    let outcome = store.upsert(device.clone());
    store.save().await?;
    info!(id = %device.id, "Device updated");
    out.device_saved(outcome, &device);
    Ok(())
}

async fn cmd_remove(cli: &Cli, out: &dyn Output, args: &cli::RemoveArgs) -> Result<()> {
    let (_, store) = open_store(cli).await?;

    // Resolve every selector before touching the collection.
    let positions = args
        .selectors
        .iter()
        .map(|selector| store.resolve(selector).map(|(pos, _)| pos))
        .collect::<Result<BTreeSet<_>>>()?;

    let removed = store.remove(&positions);
    store.save().await?;
    info!(count = removed.len(), "Devices removed");
    out.devices_removed(&removed, store.len());
    Ok(())
}

async fn cmd_move(cli: &Cli, out: &dyn Output, args: &cli::MoveArgs) -> Result<()> {
    let (_, store) = open_store(cli).await?;
    let (from, device) = store.resolve(&args.from)?;

    if !store.reorder(from, args.to) {
        return Err(InvError::InvalidPosition {
            index: from,
            len: store.len(),
        });
    }
    let to = store.position_of(device.id).unwrap_or(from);
    store.save().await?;
    out.device_moved(from, to, &device);
    Ok(())
}

async fn cmd_total(cli: &Cli, out: &dyn Output, args: &cli::TotalArgs) -> Result<()> {
    let (settings, store) = open_store(cli).await?;
    let devices = store.snapshot();

    if !args.wants_conversion() {
        let summary = CostSummary::compute(devices.as_slice(), None);
        out.cost_summary(&summary, None);
        return Ok(());
    }

    let currency = &settings.currency;
    let target = args.target.as_deref().unwrap_or(&currency.target);
    let lookup = Arc::new(RateLookup::new(&currency.base, target)?);
    let source: Arc<dyn RateSource> = Arc::new(HttpRateSource::new(
        currency.endpoint.clone(),
        currency.rates_field.clone(),
    ));

    let rate = match lookup.spawn(source) {
        Some(task) => tokio::select! {
            rate = task.join() => rate,
            _ = tokio::signal::ctrl_c() => {
                warn!("Rate lookup interrupted");
                None
            }
        },
        None => lookup.rate(),
    };

    let summary = CostSummary::compute(devices.as_slice(), rate.as_ref());
    out.cost_summary(&summary, Some(&lookup.state()));
    Ok(())
}

fn cmd_config(cli: &Cli, out: &dyn Output, args: &cli::ConfigArgs) -> Result<()> {
    if args.init {
        let path = config_file_path(cli.config.clone())?;
        if path.exists() {
            return Err(InvError::ConfigExists { path });
        }
        save_config(&AppConfig::default(), &path)?;
        out.success(&format!("Wrote default configuration to {}", path.display()));
        return Ok(());
    }

    let settings = Settings::resolve(&cli.overrides())?;
    if args.path {
        let path = config_file_path(settings.config_file.clone())?;
        let exists = path.is_file();
        out.config_path(&path, exists);
    } else {
        out.settings(&settings);
    }
    Ok(())
}

/// The given config file, or the default one in the user config directory.
fn config_file_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(|| default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAMES[0])))
        .ok_or_else(|| InvError::ConfigInvalid("Could not determine config directory".to_string()))
}

fn version_info() -> VersionInfo {
    VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty(),
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    }
}
