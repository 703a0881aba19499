//! Macro entry packing.
//!
//! A macro is a sequence of timed press/release steps replayed by the
//! device. Each step is packed into 2 or 4 bytes:
//!
//! - delay < 128 ms: `[delay | up, function]`
//! - delay >= 128 ms: `[delay % 100 | up, function, delay / 100, 0x03]`
//!
//! where `up` is 0x80 for a release. The long form splits the delay in base
//! 100, not base 128; the device firmware expects exactly this.
//!
//! Example: press left button, 50 ms, release it, 50 ms, press left shift,
//! 1378 ms, press `1`, 100 ms, release `1`, 210 ms, release left shift, 1 ms:
//!
//! ```text
//! [32 F0] [B2 F0] [4E E1 0D 03] [64 1E] [8A 1E 02 03] [81 E1]
//! ```

use crate::error::{Error, Result};
use crate::layout::MAX_MACRO_SIZE;
use crate::safety;
use tracing::trace;

const RELEASE_FLAG: u8 = 0x80;
const SHORT_DELAY_LIMIT: u16 = 128;
const LONG_FORM_FOOTER: u8 = 0x03;

/// One macro step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroEntry {
    pub function: u8,
    pub is_release: bool,
    delay_ms: u16,
}

impl MacroEntry {
    /// Create an entry, rejecting delays the wire format cannot carry.
    pub fn new(function: u8, is_release: bool, delay_ms: i64) -> Result<Self> {
        Ok(Self {
            function,
            is_release,
            delay_ms: safety::validate_delay(delay_ms)?,
        })
    }

    pub fn delay_ms(&self) -> u16 {
        self.delay_ms
    }

    /// Number of bytes this entry occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        if self.delay_ms < SHORT_DELAY_LIMIT {
            2
        } else {
            4
        }
    }

    /// Encode into `out`, returning the number of bytes used.
    pub fn encode(&self, out: &mut [u8; 4]) -> usize {
        let up = if self.is_release { RELEASE_FLAG } else { 0 };
        if self.delay_ms < SHORT_DELAY_LIMIT {
            out[0] = self.delay_ms as u8 + up;
            out[1] = self.function;
            2
        } else {
            out[0] = (self.delay_ms % 100) as u8 + up;
            out[1] = self.function;
            out[2] = (self.delay_ms / 100) as u8;
            out[3] = LONG_FORM_FOOTER;
            4
        }
    }
}

/// Append-only macro region, bounded at [`MAX_MACRO_SIZE`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroBuffer {
    bytes: Vec<u8>,
}

impl MacroBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry after all previously written ones.
    ///
    /// Fails without writing anything if the entry does not fit.
    pub fn push(&mut self, entry: &MacroEntry) -> Result<()> {
        let needed = entry.encoded_len();
        let remaining = self.remaining();
        if needed > remaining {
            return Err(Error::MacroBufferFull { needed, remaining });
        }
        let mut encoded = [0u8; 4];
        let n = entry.encode(&mut encoded);
        self.bytes.extend_from_slice(&encoded[..n]);
        trace!(
            entry = format_args!("{:02X?}", &encoded[..n]),
            bytes_written = self.bytes.len(),
            "Macro entry appended"
        );
        Ok(())
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes.len()
    }

    pub fn remaining(&self) -> usize {
        MAX_MACRO_SIZE - self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How many times the device loops the macro.
///
/// Held in host order; the device expects big-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCount(pub u16);

impl CycleCount {
    pub fn to_wire(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn from_wire(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

/// The macro region plus its loop count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroProgram {
    pub cycles: CycleCount,
    pub buffer: MacroBuffer,
}
