//! Error types for xenon-core.

use crate::transport::Selector;
use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Button name in a binding entry does not match any physical button.
    #[error("unknown button name: \"{0}\"")]
    UnknownButtonName(String),

    /// Function name in a binding entry does not match any button function.
    #[error("unknown function name: \"{0}\"")]
    UnknownFunctionName(String),

    /// DPI value outside the range the sensor accepts.
    #[error("DPI value {0} out of range (allowed 100..=7499)")]
    DpiOutOfRange(i64),

    /// Macro delay outside the encodable range.
    #[error("invalid macro delay: {0} ms")]
    InvalidDelay(i64),

    /// Appending a macro entry would overrun the macro region.
    #[error("macro buffer full: entry needs {needed} bytes, {remaining} remaining")]
    MacroBufferFull { needed: usize, remaining: usize },

    /// A control transfer did not complete.
    #[error("transfer failed for {selector}: {reason}")]
    TransferFailed { selector: Selector, reason: String },

    /// Configuration could not be read or parsed.
    #[error("configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    /// Value out of accepted range.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Configuration entry lacks a required key.
    #[error("{entry} entry is missing required field \"{field}\"")]
    MissingField {
        entry: &'static str,
        field: &'static str,
    },

    /// Configuration value has the wrong JSON type.
    #[error("field \"{field}\" has unexpected value {value}")]
    MistypedField { field: &'static str, value: String },

    /// HID device communication failure.
    #[error("HID error: {0}")]
    Hid(String),

    /// Device not found during enumeration.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Run was interrupted before all buffers were sent.
    #[error("interrupted")]
    Interrupted,
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
