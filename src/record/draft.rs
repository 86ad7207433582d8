//! Editable form state for creating or updating a record.

use chrono::{Local, NaiveDate};
use tracing::trace;
use uuid::Uuid;

use super::{DeviceCategory, DeviceRecord};

/// Field overrides entered by the user.
///
/// `None` means "leave as is" for an existing record and "use the default"
/// for a new one. Applying a draft never touches storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDraft {
    pub device_name: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<String>,
    pub serial_number: Option<String>,
    pub device_category: Option<DeviceCategory>,
    pub model: Option<String>,
    pub image_url: Option<String>,
}

impl DeviceDraft {
    /// True if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the edited record, using today's date for new records.
    #[must_use]
    pub fn apply(&self, existing: Option<&DeviceRecord>) -> DeviceRecord {
        self.apply_on(existing, Local::now().date_naive())
    }

    /// Produce the edited record.
    ///
    /// The existing record's id is kept; a new record gets a fresh one.
    /// A new record without a model takes the first suggested model of its
    /// category.
    #[must_use]
    pub fn apply_on(&self, existing: Option<&DeviceRecord>, today: NaiveDate) -> DeviceRecord {
        let Some(base) = existing else {
            let category = self.device_category.unwrap_or_default();
            let model = self.model.clone().unwrap_or_else(|| {
                category
                    .suggested_models()
                    .first()
                    .map(|m| (*m).to_string())
                    .unwrap_or_default()
            });
            trace!(%category, "Building new record from draft");
            return DeviceRecord {
                id: Uuid::new_v4(),
                device_name: self.device_name.clone().unwrap_or_default(),
                purchase_date: self.purchase_date.unwrap_or(today),
                purchase_price: self.purchase_price.clone().unwrap_or_default(),
                serial_number: self.serial_number.clone().unwrap_or_default(),
                device_category: category,
                model,
                image_url: self.image_url.clone().unwrap_or_default(),
            };
        };

        trace!(id = %base.id, "Applying draft to existing record");
        DeviceRecord {
            id: base.id,
            device_name: pick(self.device_name.as_deref(), &base.device_name),
            purchase_date: self.purchase_date.unwrap_or(base.purchase_date),
            purchase_price: pick(self.purchase_price.as_deref(), &base.purchase_price),
            serial_number: pick(self.serial_number.as_deref(), &base.serial_number),
            device_category: self.device_category.unwrap_or(base.device_category),
            model: pick(self.model.as_deref(), &base.model),
            image_url: pick(self.image_url.as_deref(), &base.image_url),
        }
    }
}

fn pick(value: Option<&str>, fallback: &str) -> String {
    value.unwrap_or(fallback).to_string()
}
