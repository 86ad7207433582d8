//! Output mode abstraction for robot and human output.

use std::path::Path;

use serde::Serialize;

use crate::cli::Cli;
use crate::config::Settings;
use crate::cost::CostSummary;
use crate::currency::RateState;
use crate::error::InvError;
use crate::record::{DeviceCategory, DeviceRecord};
use crate::store::Upserted;

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// Build metadata shown by `inv version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// A device together with its list position.
#[derive(Debug, Clone, Serialize)]
pub struct Positioned<'a> {
    pub position: usize,
    #[serde(flatten)]
    pub device: &'a DeviceRecord,
}

impl<'a> Positioned<'a> {
    /// Number every device by its list position.
    pub fn all(devices: &'a [DeviceRecord]) -> Vec<Self> {
        devices
            .iter()
            .enumerate()
            .map(|(position, device)| Self { position, device })
            .collect()
    }
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// JSON output for agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output for people.
    Human { color: bool, quiet: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human {
                color: !cli.no_color,
                quiet: cli.quiet,
            }
        }
    }

    /// Returns true if output should be JSON.
    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human { color, quiet } => Box::new(HumanOutput::new(color, quiet)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn success(&self, message: &str);
    fn error(&self, error: &InvError);
    fn warning(&self, message: &str);
    fn info(&self, message: &str);

    // Browsing
    fn device_list(&self, devices: &[DeviceRecord], long: bool);
    fn device_detail(&self, position: usize, device: &DeviceRecord);

    // Editing
    fn device_saved(&self, outcome: Upserted, device: &DeviceRecord);
    fn devices_removed(&self, removed: &[DeviceRecord], remaining: usize);
    fn device_moved(&self, from: usize, to: usize, device: &DeviceRecord);

    // Cost
    /// `conversion` is `None` when no conversion was requested.
    fn cost_summary(&self, summary: &CostSummary, conversion: Option<&RateState>);

    // Reference
    fn categories(&self, categories: &[DeviceCategory]);
    fn settings(&self, settings: &Settings);
    fn config_path(&self, path: &Path, exists: bool);

    // Metadata
    fn version_info(&self, info: &VersionInfo);
}
