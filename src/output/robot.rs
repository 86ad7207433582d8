//! Robot mode JSON output implementation.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, instrument, trace};

use crate::config::Settings;
use crate::cost::CostSummary;
use crate::currency::RateState;
use crate::error::InvError;
use crate::record::{DeviceCategory, DeviceRecord};
use crate::store::Upserted;

use super::{Output, Positioned, RobotFormat, VersionInfo};

/// JSON output implementation for agents and scripting.
///
/// Results go to stdout, errors to stderr, one JSON document per call.
#[derive(Debug, Clone, Copy)]
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    /// Serialize according to the configured format.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let rendered = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        rendered.unwrap_or_else(|e| {
            error!(error = %e, "JSON serialization failed");
            json!({ "error": true, "message": format!("serialization failed: {e}") }).to_string()
        })
    }

    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let json = self.render(data);
        trace!(json_len = json.len(), "JSON serialized");
        println!("{json}");
    }
}

/// Error document written to stderr.
#[must_use]
pub fn error_document(error: &InvError) -> Value {
    json!({
        "error": true,
        "message": error.to_string(),
        "suggestion": error.suggestion(),
        "recoverable": error.is_user_recoverable(),
    })
}

/// Document describing a cost summary and the conversion attempt.
#[must_use]
pub fn cost_document(summary: &CostSummary, conversion: Option<&RateState>) -> Value {
    let mut doc = json!({ "summary": summary });
    if let Some(state) = conversion {
        doc["conversion"] = json!(state);
    }
    doc
}

/// Document describing the categories and their suggested models.
#[must_use]
pub fn categories_document(categories: &[DeviceCategory]) -> Value {
    let entries: Vec<Value> = categories
        .iter()
        .map(|c| {
            json!({
                "name": c.name(),
                "label": c.label(),
                "suggested_models": c.suggested_models(),
            })
        })
        .collect();
    json!(entries)
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        self.output_json(&json!({ "success": true, "message": message }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &InvError) {
        debug!(error = %error, "Robot: error");
        // Errors are always pretty, matching what agents parse from stderr.
        let doc = serde_json::to_string_pretty(&error_document(error))
            .unwrap_or_else(|_| error.to_string());
        eprintln!("{doc}");
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        self.output_json(&json!({ "warning": true, "message": message }));
    }

    #[instrument(skip(self))]
    fn info(&self, message: &str) {
        self.output_json(&json!({ "info": true, "message": message }));
    }

    #[instrument(skip(self, devices), fields(count = devices.len()))]
    fn device_list(&self, devices: &[DeviceRecord], _long: bool) {
        self.output_json(&Positioned::all(devices));
    }

    #[instrument(skip(self, device), fields(id = %device.id))]
    fn device_detail(&self, position: usize, device: &DeviceRecord) {
        self.output_json(&Positioned { position, device });
    }

    #[instrument(skip(self, device), fields(id = %device.id))]
    fn device_saved(&self, outcome: Upserted, device: &DeviceRecord) {
        self.output_json(&json!({ "ok": true, "result": outcome, "device": device }));
    }

    #[instrument(skip(self, removed), fields(count = removed.len()))]
    fn devices_removed(&self, removed: &[DeviceRecord], remaining: usize) {
        self.output_json(&json!({ "ok": true, "removed": removed, "remaining": remaining }));
    }

    #[instrument(skip(self, device))]
    fn device_moved(&self, from: usize, to: usize, device: &DeviceRecord) {
        self.output_json(&json!({ "ok": true, "from": from, "to": to, "device": device }));
    }

    #[instrument(skip_all)]
    fn cost_summary(&self, summary: &CostSummary, conversion: Option<&RateState>) {
        self.output_json(&cost_document(summary, conversion));
    }

    fn categories(&self, categories: &[DeviceCategory]) {
        self.output_json(&categories_document(categories));
    }

    fn settings(&self, settings: &Settings) {
        self.output_json(settings);
    }

    fn config_path(&self, path: &Path, exists: bool) {
        self.output_json(&json!({ "path": path.display().to_string(), "exists": exists }));
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }
}
