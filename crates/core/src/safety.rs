//! Safety layer: validates configuration values against the ranges the
//! device firmware understands before they are encoded.
//!
//! # Xenon 750 Bounds
//!
//! ## DPI
//! - **Range**: 100 – 7,499 DPI
//! - **Encoding**: one byte, `dpi / 100` (floor). 1260 is stored as 12 and
//!   behaves as 1200 DPI on the device.
//!
//! ## DPI Modes
//! - **Range**: 1 – 6 (as written in configuration files)
//!
//! ## Macro Delays
//! - **Range**: 1 – 25,599 ms
//! - Delays of 128 ms and above are stored as `delay / 100` in a single byte,
//!   so 25,599 is the largest delay whose hundreds part still fits.
//!
//! ## Safety Invariants
//! 1. Nothing out of range is ever written into an encoder's state
//! 2. Validation failures never partially update a field

use crate::error::{Error, Result};
use crate::layout::DPI_MODE_COUNT;

/// Xenon 750 DPI constraints.
pub const DPI_MIN: i64 = 100;
pub const DPI_MAX: i64 = 7499;
pub const DPI_STEP: i64 = 100;

/// Macro delay constraints, in milliseconds.
pub const MACRO_DELAY_MIN: i64 = 1;
pub const MACRO_DELAY_MAX: i64 = 25_599;

/// Validate a DPI value and quantize it to the device's one-byte code.
pub fn validate_dpi(dpi: i64) -> Result<u8> {
    if !(DPI_MIN..=DPI_MAX).contains(&dpi) {
        return Err(Error::DpiOutOfRange(dpi));
    }
    // Floor, not round: 1299 -> 12.
    Ok((dpi / DPI_STEP) as u8)
}

/// Validate a 1-based DPI mode number and return its 0-based slot.
pub fn validate_dpi_mode(mode: i64) -> Result<usize> {
    if !(1..=DPI_MODE_COUNT as i64).contains(&mode) {
        return Err(Error::OutOfRange {
            field: "mode",
            value: mode,
            min: 1,
            max: DPI_MODE_COUNT as i64,
        });
    }
    Ok((mode - 1) as usize)
}

/// Validate a macro delay in milliseconds.
pub fn validate_delay(delay_ms: i64) -> Result<u16> {
    if !(MACRO_DELAY_MIN..=MACRO_DELAY_MAX).contains(&delay_ms) {
        return Err(Error::InvalidDelay(delay_ms));
    }
    Ok(delay_ms as u16)
}

/// Validate that a configuration integer fits in one byte.
pub fn validate_byte(field: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::OutOfRange {
        field,
        value,
        min: 0,
        max: u8::MAX as i64,
    })
}

/// Validate that a configuration integer fits in 16 bits.
pub fn validate_u16(field: &'static str, value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::OutOfRange {
        field,
        value,
        min: 0,
        max: u16::MAX as i64,
    })
}
