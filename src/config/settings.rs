//! Application settings from an optional YAML or TOML file.
//!
//! # Example TOML
//!
//! ```toml
//! data_file = "~/Documents/devices.json"
//!
//! [currency]
//! endpoint = "https://open.er-api.com/v6/latest"
//! base = "EUR"
//! target = "USD"
//! rates_field = "rates"
//! ```
//!
//! Every key is optional. Command-line flags (and their `INV_*` environment
//! variables) take precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use super::path::PathResolver;
use crate::currency::{normalize_code, DEFAULT_ENDPOINT, DEFAULT_RATES_FIELD};
use crate::error::{InvError, Result, ResultExt};
use crate::store::persist::{default_data_path, APP_DIR};

/// File names searched for in the default config directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["config.toml", "config.yaml", "config.yml"];

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (.yaml, .yml).
    Yaml,
    /// TOML (.toml).
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }

    fn require(path: &Path) -> Result<Self> {
        Self::from_extension(path).ok_or_else(|| {
            InvError::ConfigParse(format!(
                "Unknown config format for '{}': expected .yaml, .yml, or .toml",
                path.display()
            ))
        })
    }
}

/// Exchange-rate endpoint and currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Base URL; the base currency is appended as a path segment.
    pub endpoint: String,
    /// Currency prices are recorded in.
    pub base: String,
    /// Currency totals are converted into.
    pub target: String,
    /// Name of the rate table in the endpoint's response.
    pub rates_field: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            base: "EUR".to_string(),
            target: "USD".to_string(),
            rates_field: DEFAULT_RATES_FIELD.to_string(),
        }
    }
}

impl CurrencyConfig {
    /// Check the endpoint and normalise both currency codes.
    pub fn normalize(mut self) -> Result<Self> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(InvError::ConfigInvalid(format!(
                "currency endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if self.rates_field.trim().is_empty() {
            return Err(InvError::ConfigInvalid(
                "currency rates_field must not be empty".to_string(),
            ));
        }
        self.endpoint = endpoint.to_string();
        self.base = normalize_code(&self.base)?;
        self.target = normalize_code(&self.target)?;
        Ok(self)
    }
}

/// Contents of a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data file location; relative paths resolve against the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    pub currency: CurrencyConfig,
}

impl AppConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        trace!("Validating config");
        if self
            .data_file
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(InvError::ConfigInvalid("data_file must not be empty".to_string()));
        }
        self.currency.clone().normalize().map_err(|e| match e {
            InvError::InvalidCurrency { value } => {
                InvError::ConfigInvalid(format!("invalid currency code '{value}'"))
            }
            other => other,
        })?;
        Ok(())
    }
}

/// Load a config file, detecting the format from its extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::require(path)?;
    debug!(?format, "Detected config format");

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            InvError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            InvError::Io(e)
        }
    })?;

    load_config_from_str(&content, format)
}

/// Parse and validate config text.
#[instrument(skip(content), fields(format = ?format, content_len = content.len()))]
pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<AppConfig> {
    let config: AppConfig = match format {
        // An empty YAML document is `null`, not an empty mapping.
        ConfigFormat::Yaml if content.trim().is_empty() => AppConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| InvError::ConfigParse(format!("YAML: {e}")))?,
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| InvError::ConfigParse(format!("TOML: {e}")))?
        }
    };

    config.validate()?;
    debug!(
        data_file = ?config.data_file,
        base = %config.currency.base,
        target = %config.currency.target,
        "Configuration loaded"
    );
    Ok(config)
}

/// Write a config file, creating its directory if needed.
#[instrument(skip(config), fields(path = %path.as_ref().display()))]
pub fn save_config<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = ConfigFormat::require(path)?;

    let content = match format {
        ConfigFormat::Yaml => {
            serde_yaml::to_string(config).map_err(|e| InvError::ConfigParse(format!("YAML: {e}")))?
        }
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| InvError::ConfigParse(format!("TOML: {e}")))?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("writing config file {}", path.display()))?;
    info!("Configuration saved");
    Ok(())
}

/// Per-user config directory, e.g. `~/.config/device-inventory`.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// First existing config file in `dir`.
#[must_use]
pub fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub base: Option<String>,
    pub target: Option<String>,
}

/// Effective settings after merging file, defaults, and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// The config file that was read, if any.
    pub config_file: Option<PathBuf>,
    pub data_file: PathBuf,
    pub currency: CurrencyConfig,
}

impl Settings {
    /// Resolve settings using the per-user config directory.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        Self::resolve_in(overrides, default_config_dir().as_deref())
    }

    /// Resolve settings, looking for an implicit config file in `config_dir`.
    ///
    /// An explicit `--config` that does not exist is an error; a missing
    /// implicit one just means defaults.
    #[instrument(skip_all)]
    pub fn resolve_in(overrides: &Overrides, config_dir: Option<&Path>) -> Result<Self> {
        let config_file = overrides
            .config
            .clone()
            .or_else(|| config_dir.and_then(find_config_in));

        let (config, resolver) = match &config_file {
            Some(path) => (load_config(path)?, Some(PathResolver::new(path)?)),
            None => {
                debug!("No config file, using defaults");
                (AppConfig::default(), None)
            }
        };

        let data_file = match (&overrides.data_file, &config.data_file, &resolver) {
            (Some(path), _, _) => path.clone(),
            (None, Some(path), Some(resolver)) => resolver.resolve(path)?,
            (None, Some(path), None) => path.clone(),
            (None, None, _) => default_data_path()?,
        };

        let mut currency = config.currency;
        if let Some(endpoint) = &overrides.endpoint {
            currency.endpoint.clone_from(endpoint);
        }
        if let Some(base) = &overrides.base {
            currency.base.clone_from(base);
        }
        if let Some(target) = &overrides.target {
            currency.target.clone_from(target);
        }
        let currency = currency.normalize()?;

        info!(
            config_file = ?config_file,
            data_file = %data_file.display(),
            "Settings resolved"
        );
        Ok(Self {
            config_file,
            data_file,
            currency,
        })
    }
}
