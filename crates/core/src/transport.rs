//! Control transfer abstraction for device communication.
//!
//! Provides a trait-based transport layer so that the real device and the
//! test mock share the same interface.
//!
//! All three buffers go out as class-specific SET_REPORT requests
//! (`bmRequestType = 0x21`, `bRequest = 9`) on interface 1. The selector is
//! the request's `wValue`: high byte 0x03 (feature report), low byte the
//! report ID, which is also the first byte of each buffer.

use crate::error::{Error, Result};
use crate::layout;
use crate::settings::EncodedBuffers;
use tracing::{debug, info, trace};

/// Interface the configuration requests are addressed to.
pub const CONTROL_INTERFACE: i32 = 1;

/// Which configuration buffer a transfer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    DpiConfig,
    CurrentModes,
    MacroAndButtons,
}

impl Selector {
    /// Transfer order required by the device.
    pub const ORDER: [Selector; 3] = [
        Selector::DpiConfig,
        Selector::CurrentModes,
        Selector::MacroAndButtons,
    ];

    /// Request `wValue`.
    pub fn value(self) -> u16 {
        match self {
            Self::DpiConfig => 0x0304,
            Self::CurrentModes => 0x0308,
            Self::MacroAndButtons => 0x0306,
        }
    }

    /// Feature report ID (low byte of the selector).
    pub fn report_id(self) -> u8 {
        (self.value() & 0xFF) as u8
    }

    /// Exact buffer length the device expects.
    pub fn expected_len(self) -> usize {
        match self {
            Self::DpiConfig => layout::dpi::LEN,
            Self::CurrentModes => layout::modes::LEN,
            Self::MacroAndButtons => layout::composite::LEN,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "selector 0x{:04X}", self.value())
    }
}

/// Abstraction over the device's control endpoint.
///
/// Implementations send `data` as one feature report and report only
/// success or failure. They must not retry.
///
/// The hidapi implementation has no per-call timeout; the kernel's control
/// transfer timeout applies in place of a fixed 1000 ms.
pub trait ControlTransport: Send {
    fn send_feature_report(&self, selector: Selector, data: &[u8]) -> Result<()>;
}

/// Send one buffer, checking it against the selector first.
pub fn transfer(transport: &dyn ControlTransport, selector: Selector, data: &[u8]) -> Result<()> {
    if data.len() != selector.expected_len() {
        return Err(Error::TransferFailed {
            selector,
            reason: format!(
                "buffer is {} bytes, expected {}",
                data.len(),
                selector.expected_len()
            ),
        });
    }
    if data[0] != selector.report_id() {
        return Err(Error::TransferFailed {
            selector,
            reason: format!(
                "report ID 0x{:02X} does not match 0x{:02X}",
                data[0],
                selector.report_id()
            ),
        });
    }

    trace!(%selector, data_hex = format_args!("{:02X?}", data), "Control OUT");
    transport
        .send_feature_report(selector, data)
        .map_err(|e| match e {
            Error::TransferFailed { .. } | Error::Interrupted => e,
            other => Error::TransferFailed {
                selector,
                reason: other.to_string(),
            },
        })?;
    debug!(%selector, len = data.len(), "Transfer complete");
    Ok(())
}

/// Send all three buffers in device order, stopping at the first failure.
pub fn transfer_settings(transport: &dyn ControlTransport, buffers: &EncodedBuffers) -> Result<()> {
    for (selector, data) in buffers.frames() {
        transfer(transport, selector, data)?;
    }
    info!("Configuration written to device");
    Ok(())
}
