//! Human-friendly output implementation using `console` styling.

use std::fmt::Write as _;
use std::path::Path;

use console::{measure_text_width, pad_str, truncate_str, Alignment};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::cost::CostSummary;
use crate::currency::RateState;
use crate::error::InvError;
use crate::record::{DeviceCategory, DeviceRecord, ImageRef};
use crate::store::Upserted;
use crate::theme::InvTheme;

use super::{Output, VersionInfo};

const NAME_COLUMN_MAX: usize = 32;

/// Styled terminal output implementation for people.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    theme: InvTheme,
    quiet: bool,
}

impl HumanOutput {
    #[instrument]
    pub fn new(color: bool, quiet: bool) -> Self {
        debug!("Creating HumanOutput");
        Self {
            theme: if color {
                InvTheme::default()
            } else {
                InvTheme::plain()
            },
            quiet,
        }
    }

    #[must_use]
    pub const fn with_theme(theme: InvTheme, quiet: bool) -> Self {
        Self { theme, quiet }
    }

    fn label(&self, name: &str) -> String {
        self.theme.label.apply_to(format!("  {name:<10}")).to_string()
    }

    /// One line per device, or a detail block each with `long`.
    #[must_use]
    pub fn render_device_list(&self, devices: &[DeviceRecord], long: bool) -> String {
        if devices.is_empty() {
            return format!(
                "{}\nAdd one with: {}\n",
                self.theme.warning.apply_to("No devices yet"),
                self.theme.accent.apply_to("inv add <NAME>")
            );
        }
        if long {
            return devices
                .iter()
                .enumerate()
                .map(|(pos, d)| self.render_device_detail(pos, d))
                .collect::<Vec<_>>()
                .join("\n");
        }

        let width = devices
            .iter()
            .map(|d| measure_text_width(&d.device_name))
            .max()
            .unwrap_or(0)
            .clamp(4, NAME_COLUMN_MAX);

        let mut out = String::new();
        for (pos, device) in devices.iter().enumerate() {
            let name = truncate_str(&device.device_name, width, "…");
            let _ = writeln!(
                out,
                "{:>3}  {}  {}  {}  {}",
                self.theme.position.apply_to(pos),
                self.theme.short_id.apply_to(device.short_id()),
                pad_str(&name, width, Alignment::Left, None),
                device.device_category.label(),
                self.theme.price.apply_to(&device.purchase_price),
            );
        }
        out
    }

    /// Every field of one device.
    #[must_use]
    pub fn render_device_detail(&self, position: usize, device: &DeviceRecord) -> String {
        let mut out = format!(
            "{} {}\n",
            self.theme.position.apply_to(format!("#{position}")),
            self.theme.header.apply_to(&device.device_name)
        );
        let image = match device.image() {
            ImageRef::Remote(url) => url.to_string(),
            ImageRef::Placeholder => self.theme.muted.apply_to("(placeholder)").to_string(),
        };
        let rows = [
            ("Id", device.id.to_string()),
            ("Category", device.device_category.label().to_string()),
            ("Model", device.model.clone()),
            ("Purchased", device.purchase_date.format("%Y-%m-%d").to_string()),
            ("Price", device.purchase_price.clone()),
            ("Serial", device.serial_number.clone()),
            ("Image", image),
        ];
        for (name, value) in rows {
            let _ = writeln!(out, "{}{}", self.label(name), self.theme.value.apply_to(value));
        }
        out
    }

    /// Total, per-category subtotals, and the converted total if any.
    #[must_use]
    pub fn render_cost_summary(&self, summary: &CostSummary) -> String {
        let currency = summary
            .currency
            .as_deref()
            .map(|c| format!(" {c}"))
            .unwrap_or_default();
        let mut out = format!(
            "{}{}{}  ({} devices)\n",
            self.label("Total"),
            self.theme.total.apply_to(money(summary.total)),
            currency,
            summary.device_count
        );

        for entry in &summary.by_category {
            let _ = writeln!(
                out,
                "    {}  {} ({})",
                pad_str(entry.category.label(), 16, Alignment::Left, None),
                self.theme.price.apply_to(money(entry.total)),
                entry.count
            );
        }

        if let Some(converted) = &summary.converted {
            let _ = writeln!(
                out,
                "{}{} {}  {}",
                self.label("Converted"),
                self.theme.total.apply_to(money(converted.amount)),
                converted.currency,
                self.theme.muted.apply_to(format!("(rate {})", converted.rate))
            );
        }

        if summary.unparsed_prices > 0 {
            let _ = writeln!(
                out,
                "{}",
                self.theme.muted.apply_to(format!(
                    "  {} price(s) could not be read and count as 0",
                    summary.unparsed_prices
                ))
            );
        }
        if summary.overflowed_prices > 0 {
            let _ = writeln!(
                out,
                "{}",
                self.theme.muted.apply_to(format!(
                    "  {} price(s) left out: total out of range",
                    summary.overflowed_prices
                ))
            );
        }
        out
    }

    #[must_use]
    pub fn render_categories(&self, categories: &[DeviceCategory]) -> String {
        let mut out = String::new();
        for category in categories {
            let _ = writeln!(
                out,
                "{}  {}  {}",
                self.theme.value.apply_to(pad_str(category.name(), 10, Alignment::Left, None)),
                pad_str(category.label(), 16, Alignment::Left, None),
                self.theme.muted.apply_to(category.suggested_models().join(", "))
            );
        }
        out
    }

    #[must_use]
    pub fn render_settings(&self, settings: &Settings) -> String {
        let config_file = settings.config_file.as_ref().map_or_else(
            || self.theme.muted.apply_to("(none, using defaults)").to_string(),
            |p| p.display().to_string(),
        );
        let rows = [
            ("Config", config_file),
            ("Data file", settings.data_file.display().to_string()),
            ("Endpoint", settings.currency.endpoint.clone()),
            ("Base", settings.currency.base.clone()),
            ("Target", settings.currency.target.clone()),
            ("Rates key", settings.currency.rates_field.clone()),
        ];
        let mut out = String::new();
        for (name, value) in rows {
            let _ = writeln!(out, "{}{}", self.label(name), value);
        }
        out
    }

    #[must_use]
    pub fn render_version(&self, info: &VersionInfo) -> String {
        let mut out = format!(
            "{} {}\n",
            self.theme.header.apply_to("inv"),
            self.theme.value.apply_to(info.version)
        );
        let dirty = if info.git_dirty {
            self.theme.warning.apply_to(" (dirty)").to_string()
        } else {
            String::new()
        };
        let _ = writeln!(out, "{}{}{dirty}", self.label("Git SHA"), info.git_sha);
        for (name, value) in [
            ("Built", info.build_timestamp),
            ("Rust", info.rustc_version),
            ("Target", info.target),
        ] {
            let _ = writeln!(out, "{}{}", self.label(name), self.theme.muted.apply_to(value));
        }
        out
    }
}

/// Amounts are shown with at most two decimals.
fn money(amount: Decimal) -> String {
    amount.round_dp(2).to_string()
}

impl Output for HumanOutput {
    fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", self.theme.success.apply_to("✓"));
        }
    }

    fn error(&self, error: &InvError) {
        eprintln!("{}: {error}", self.theme.error.apply_to("Error"));
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {suggestion}", self.theme.warning.apply_to("Hint"));
        }
    }

    fn warning(&self, message: &str) {
        eprintln!("{}: {message}", self.theme.warning.apply_to("Warning"));
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    #[instrument(skip(self, devices), fields(count = devices.len()))]
    fn device_list(&self, devices: &[DeviceRecord], long: bool) {
        print!("{}", self.render_device_list(devices, long));
    }

    fn device_detail(&self, position: usize, device: &DeviceRecord) {
        print!("{}", self.render_device_detail(position, device));
    }

    fn device_saved(&self, outcome: Upserted, device: &DeviceRecord) {
        let verb = match outcome {
            Upserted::Inserted(_) => "Added",
            Upserted::Replaced(_) => "Updated",
        };
        self.success(&format!(
            "{verb} {} at position {} ({})",
            device.device_name,
            outcome.position(),
            device.short_id()
        ));
    }

    fn devices_removed(&self, removed: &[DeviceRecord], remaining: usize) {
        for device in removed {
            self.success(&format!("Removed {} ({})", device.device_name, device.short_id()));
        }
        self.info(&format!("{remaining} device(s) left"));
    }

    fn device_moved(&self, from: usize, to: usize, device: &DeviceRecord) {
        self.success(&format!("Moved {} from {from} to {to}", device.device_name));
    }

    #[instrument(skip_all)]
    fn cost_summary(&self, summary: &CostSummary, conversion: Option<&RateState>) {
        print!("{}", self.render_cost_summary(summary));
        match conversion {
            Some(RateState::Failed { reason }) => {
                self.warning(&format!("Total not converted: {reason}"));
            }
            Some(RateState::Idle | RateState::InFlight) => {
                self.warning("Total not converted: no exchange rate available");
            }
            Some(RateState::Succeeded { .. }) if summary.converted.is_none() => {
                self.warning("Total not converted: converted amount is out of range");
            }
            Some(RateState::Succeeded { .. }) | None => {}
        }
    }

    fn categories(&self, categories: &[DeviceCategory]) {
        print!("{}", self.render_categories(categories));
    }

    fn settings(&self, settings: &Settings) {
        print!("{}", self.render_settings(settings));
    }

    fn config_path(&self, path: &Path, exists: bool) {
        if exists {
            println!("{}", path.display());
        } else {
            println!(
                "{} {}",
                path.display(),
                self.theme.muted.apply_to("(not created yet)")
            );
        }
    }

    fn version_info(&self, info: &VersionInfo) {
        print!("{}", self.render_version(info));
    }
}
