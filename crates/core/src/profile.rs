//! Configuration file model.
//!
//! Every field is optional and every value is wrapped in a [`Setting`], so
//! a missing or mistyped value never rejects the whole file. Such values
//! are reported per entry when the profile is applied (see
//! [`crate::settings`]).
//!
//! ```json
//! {
//!   "poll_rate": 3,
//!   "dpi_modes": [{ "mode": 1, "dpi": 800, "color": 7, "active": 1 }],
//!   "buttons_functionalities": [{ "name": "back_btn", "fun": "macro", "arg1": 1 }],
//!   "macro": {
//!     "num_of_cycles": 1,
//!     "entries": [{ "fun": 240, "fun_up": false, "delay": 50 }]
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use tracing::debug;

/// A configured value, kept even when its JSON type is wrong.
///
/// A mistyped value is reported when the profile is applied, so it only
/// costs the field it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    Value(T),
    Mistyped(serde_json::Value),
}

impl<T: Clone> Setting<T> {
    /// The value, or [`Error::MistypedField`] naming `field`.
    pub fn get(&self, field: &'static str) -> Result<T> {
        match self {
            Setting::Value(value) => Ok(value.clone()),
            Setting::Mistyped(raw) => Err(Error::MistypedField {
                field,
                value: raw.to_string(),
            }),
        }
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Value(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&raw) {
            Ok(value) => Setting::Value(value),
            Err(_) => Setting::Mistyped(raw),
        })
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Setting::Value(value) => value.serialize(serializer),
            Setting::Mistyped(raw) => raw.serialize(serializer),
        }
    }
}

/// Release marker of a macro step: `true`/`false` or an integer where
/// non-zero means release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseFlag {
    Bool(bool),
    Int(i64),
}

impl ReleaseFlag {
    pub fn is_release(self) -> bool {
        match self {
            ReleaseFlag::Bool(up) => up,
            ReleaseFlag::Int(n) => n != 0,
        }
    }
}

/// A mouse configuration as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub poll_rate: Option<Setting<i64>>,
    pub dpi_modes: Vec<DpiModeConfig>,
    #[serde(alias = "button_functionalities")]
    pub buttons_functionalities: Vec<ButtonConfig>,
    #[serde(rename = "macro")]
    pub macro_config: Option<MacroConfig>,
}

/// Per-mode DPI override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpiModeConfig {
    /// 1-based mode number.
    pub mode: Option<Setting<i64>>,
    pub dpi: Option<Setting<i64>>,
    pub color: Option<Setting<i64>>,
    /// `<= 0` switches the mode off.
    pub active: Option<Setting<i64>>,
}

/// Button function assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub name: Option<Setting<String>>,
    pub fun: Option<Setting<String>>,
    pub arg1: Option<Setting<i64>>,
    pub arg2: Option<Setting<i64>>,
    pub arg3: Option<Setting<i64>>,
}

impl ButtonConfig {
    /// Configured arguments, unsupplied ones as 0.
    pub fn args(&self) -> Result<[i64; 3]> {
        let arg = |setting: &Option<Setting<i64>>, field| {
            setting.as_ref().map_or(Ok(0), |s| s.get(field))
        };
        Ok([
            arg(&self.arg1, "arg1")?,
            arg(&self.arg2, "arg2")?,
            arg(&self.arg3, "arg3")?,
        ])
    }
}

/// Macro definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub num_of_cycles: Option<Setting<i64>>,
    pub entries: Vec<MacroEntryConfig>,
}

/// One macro step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroEntryConfig {
    pub fun: Option<Setting<i64>>,
    pub fun_up: Option<Setting<ReleaseFlag>>,
    /// Milliseconds; 1 when omitted.
    pub delay: Option<Setting<i64>>,
}

/// Delay used when a macro entry does not specify one.
pub const DEFAULT_MACRO_DELAY_MS: i64 = 1;

impl Profile {
    /// Parse a profile from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ConfigurationUnavailable(e.to_string()))
    }

    /// Load a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigurationUnavailable(format!("{}: {e}", path.display()))
        })?;
        let profile = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            dpi_modes = profile.dpi_modes.len(),
            buttons = profile.buttons_functionalities.len(),
            macro_entries = profile.macro_config.as_ref().map_or(0, |m| m.entries.len()),
            "Profile loaded"
        );
        Ok(profile)
    }
}
