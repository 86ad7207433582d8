//! Device categories and their suggested models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvError;

/// Closed set of device categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    #[default]
    Phone,
    Laptop,
    Watch,
    SpeakerHub,
    Earphones,
}

impl DeviceCategory {
    /// All categories in display order.
    pub const ALL: [Self; 5] = [
        Self::Phone,
        Self::Laptop,
        Self::Watch,
        Self::SpeakerHub,
        Self::Earphones,
    ];

    /// Canonical name, as written to disk.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::Laptop => "Laptop",
            Self::Watch => "Watch",
            Self::SpeakerHub => "SpeakerHub",
            Self::Earphones => "Earphones",
        }
    }

    /// Short label with an icon, for list views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Phone => "📱 Phone",
            Self::Laptop => "💻 Laptop",
            Self::Watch => "⌚ Watch",
            Self::SpeakerHub => "🔊 Speaker hub",
            Self::Earphones => "🎧 Earphones",
        }
    }

    /// Models offered when picking this category. Never enforced.
    #[must_use]
    pub const fn suggested_models(self) -> &'static [&'static str] {
        match self {
            Self::Phone => &["iPhone 12", "iPhone 13", "iPhone 14", "iPhone 15"],
            Self::Laptop => &["MacBook Air", "MacBook Pro"],
            Self::Watch => &["Watch SE", "Watch Ultra"],
            Self::SpeakerHub => &["HomePod", "HomePod Mini"],
            Self::Earphones => &["AirPods Pro", "AirPods Max"],
        }
    }

    /// Match a canonical name or a legacy label such as `"📱 iPhone"`.
    ///
    /// Icons, spaces and case are ignored.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "phone" | "iphone" | "smartphone" => Some(Self::Phone),
            "laptop" | "macbook" | "notebook" => Some(Self::Laptop),
            "watch" | "applewatch" | "smartwatch" => Some(Self::Watch),
            "speakerhub" | "speaker" | "homepod" | "smartspeaker" => Some(Self::SpeakerHub),
            "earphones" | "airpod" | "airpods" | "headphones" | "earbuds" => {
                Some(Self::Earphones)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceCategory {
    type Err = InvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| InvError::InvalidCategory {
            value: s.to_string(),
        })
    }
}
