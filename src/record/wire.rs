//! Version-tolerant on-disk decoding of device records.
//!
//! Files written by earlier versions differ from the current layout:
//!
//! - `purchasePrice` did not exist
//! - `serialNumber` was a number
//! - dates were seconds since 2001-01-01T00:00:00Z
//! - category and model lived under `selectedDevice` / `selectedModel`,
//!   with labels such as `"📱 iPhone"`
//! - records had no persisted `id`
//!
//! Every field is read as a raw JSON value and interpreted leniently, so a
//! single odd field never rejects the whole file. A record without a usable
//! id gets one derived from its fields, so reading the same file twice gives
//! the same ids.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use super::{DeviceCategory, DeviceRecord, REFERENCE_DATE};

/// Namespace for ids derived from record contents.
const DERIVED_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5c1e_9a47_3d0b_4f62_8e15_b7a0_c4d2_f391);

/// Raw record shape accepted on read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWire {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, alias = "name")]
    device_name: Option<Value>,
    #[serde(default)]
    purchase_date: Option<Value>,
    #[serde(default, alias = "price")]
    purchase_price: Option<Value>,
    #[serde(default)]
    serial_number: Option<Value>,
    #[serde(default, alias = "selectedDevice", alias = "category")]
    device_category: Option<Value>,
    #[serde(default, alias = "selectedModel")]
    model: Option<Value>,
    #[serde(default, rename = "imageURL", alias = "imageUrl")]
    image_url: Option<Value>,
}

impl From<RecordWire> for DeviceRecord {
    fn from(wire: RecordWire) -> Self {
        let id = wire.id.as_ref().and_then(decode_id);

        let mut record = Self {
            id: id.unwrap_or_else(Uuid::nil),
            device_name: decode_text(wire.device_name),
            purchase_date: wire
                .purchase_date
                .as_ref()
                .and_then(decode_date)
                .unwrap_or(REFERENCE_DATE),
            purchase_price: decode_text(wire.purchase_price),
            serial_number: decode_text(wire.serial_number),
            device_category: wire
                .device_category
                .as_ref()
                .and_then(Value::as_str)
                .and_then(DeviceCategory::from_label)
                .unwrap_or_default(),
            model: decode_text(wire.model),
            image_url: decode_text(wire.image_url),
        };
        if id.is_none() {
            record.id = derived_id(&record);
            trace!(id = %record.id, "Record has no usable id, derived one");
        }
        record
    }
}

/// Stable id for a record that was stored without one.
fn derived_id(record: &DeviceRecord) -> Uuid {
    let date = record.purchase_date.to_string();
    let key = [
        record.device_name.as_str(),
        date.as_str(),
        record.purchase_price.as_str(),
        record.serial_number.as_str(),
        record.device_category.name(),
        record.model.as_str(),
        record.image_url.as_str(),
    ]
    .join("\u{1f}");
    Uuid::new_v5(&DERIVED_ID_NAMESPACE, key.as_bytes())
}

fn decode_id(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

/// Strings pass through, numbers and booleans are rendered, anything else is empty.
fn decode_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339, or seconds since the reference date.
pub fn decode_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        }
        Value::Number(n) => {
            let seconds = n.as_f64()?;
            let date = reference_seconds_to_date(seconds);
            debug!(seconds, ?date, "Decoded legacy numeric date");
            date
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn reference_seconds_to_date(seconds: f64) -> Option<NaiveDate> {
    if !seconds.is_finite() {
        return None;
    }
    let epoch: NaiveDateTime = REFERENCE_DATE.and_hms_opt(0, 0, 0)?;
    let offset = Duration::try_milliseconds((seconds * 1000.0).round() as i64)?;
    epoch.checked_add_signed(offset).map(|dt| dt.date())
}
