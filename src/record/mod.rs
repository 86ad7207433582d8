//! Device record model.
//!
//! A [`DeviceRecord`] is one inventory entry. Records are written in a
//! single canonical layout and read back through a lenient decoder (see
//! [`wire`]) that accepts every layout earlier versions produced.

mod category;
mod draft;
mod wire;

pub use category::DeviceCategory;
pub use draft::DeviceDraft;
pub use wire::decode_date;

use chrono::{Local, NaiveDate};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InvError, Result};

/// Epoch of legacy numeric dates, and the date used when none can be read.
pub const REFERENCE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2001, 1, 1) {
    Some(date) => date,
    None => panic!("invalid reference date"),
};

/// One inventory entry describing an owned device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "wire::RecordWire")]
pub struct DeviceRecord {
    /// Identity, minted once at creation.
    pub id: Uuid,
    pub device_name: String,
    pub purchase_date: NaiveDate,
    /// Free text; see [`crate::cost::parse_price`].
    pub purchase_price: String,
    pub serial_number: String,
    pub device_category: DeviceCategory,
    pub model: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

impl DeviceRecord {
    /// Create a record with a fresh id and empty optional fields.
    #[must_use]
    pub fn new(
        device_name: impl Into<String>,
        purchase_date: NaiveDate,
        device_category: DeviceCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_name: device_name.into(),
            purchase_date,
            purchase_price: String::new(),
            serial_number: String::new(),
            device_category,
            model: String::new(),
            image_url: String::new(),
        }
    }

    /// Set the purchase price text.
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.purchase_price = price.into();
        self
    }

    /// Set the serial number.
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = serial.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    /// Short id used in list views.
    #[must_use]
    pub fn short_id(&self) -> String {
        let mut s = self.id.simple().to_string();
        s.truncate(8);
        s
    }

    /// Where the preview image comes from.
    #[must_use]
    pub fn image(&self) -> ImageRef {
        ImageRef::from_url_text(&self.image_url)
    }
}

/// Preview image source. Bad or missing URLs degrade to the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Remote(Url),
    Placeholder,
}

impl ImageRef {
    #[must_use]
    pub fn from_url_text(text: &str) -> Self {
        match Url::parse(text.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::Placeholder,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Parse a user-entered purchase date.
///
/// Accepts `YYYY-MM-DD` or `today`.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| InvError::InvalidDate {
        value: text.to_string(),
    })
}
