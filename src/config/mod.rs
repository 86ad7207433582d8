//! Configuration for the inventory CLI.
//!
//! Handles the optional YAML/TOML settings file, path resolution for paths
//! written in it, and merging with command-line overrides.

mod path;
mod settings;

pub use path::{home_dir, resolve_path, PathResolver};
pub use settings::{
    default_config_dir, find_config_in, load_config, load_config_from_str, save_config, AppConfig,
    ConfigFormat, CurrencyConfig, Overrides, Settings, CONFIG_FILE_NAMES,
};
