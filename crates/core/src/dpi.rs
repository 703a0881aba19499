//! DPI configuration (selector 0x0304) and current modes (selector 0x0308).
//!
//! DPI buffer, 59 bytes:
//!   - byte 2: number of active DPI modes
//!   - bytes 5..11: DPI code per mode (`dpi / 100`, +0x80 when the mode is off)
//!   - bytes 44..50: logo/scroll wheel color per mode
//!
//! Modes buffer, 9 bytes:
//!   - byte 2: USB polling rate selector
//!   - byte 5: current DPI mode
//!
//! Every other byte is copied verbatim from the factory data.

use crate::error::Result;
use crate::layout::{self, DPI_MODE_COUNT};
use crate::safety;
use tracing::debug;

/// Factory DPI configuration.
pub const DEFAULT_DPI_DATA: [u8; layout::dpi::LEN] = [
    0x04, 0x00, 0x06, 0x50, 0x00, 0x0C, 0x18, 0x24, 0x30, 0x3C, 0x48, 0x80, 0x80, 0x80, 0x80, 0x80,
    0x80, 0x80, 0x80, 0x80, 0x80, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0x04, 0x02, 0x06,
    0x03, 0x01, 0x00, 0x00, 0x20, 0x59, 0x4A, 0x47, 0x31, 0x38, 0x42,
];

/// Factory modes configuration.
pub const DEFAULT_MODES_DATA: [u8; layout::modes::LEN] =
    [0x08, 0x01, 0x03, 0x03, 0x03, 0x01, 0x03, 0x01, 0x00];

/// Added to a mode's DPI code when the mode is switched off.
const INACTIVE_FLAG: u8 = 0x80;

/// A validated DPI mode slot (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSlot(usize);

impl ModeSlot {
    /// Resolve a 1-based mode number as written in configuration.
    pub fn from_config(mode: i64) -> Result<Self> {
        safety::validate_dpi_mode(mode).map(Self)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// 1-based mode number.
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

/// Settings for one DPI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpiMode {
    /// `dpi / 100`, without the inactive flag.
    pub code: u8,
    pub active: bool,
    /// RGB-packed color byte.
    pub color: u8,
}

impl DpiMode {
    fn wire_code(&self) -> u8 {
        if self.active {
            self.code
        } else {
            self.code.wrapping_add(INACTIVE_FLAG)
        }
    }
}

/// All DPI modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpiSettings {
    modes: [DpiMode; DPI_MODE_COUNT],
}

impl Default for DpiSettings {
    fn default() -> Self {
        let codes = layout::dpi::DPI_CODES.slice(&DEFAULT_DPI_DATA);
        let colors = layout::dpi::COLORS.slice(&DEFAULT_DPI_DATA);
        Self {
            modes: std::array::from_fn(|i| DpiMode {
                code: codes[i] & !INACTIVE_FLAG,
                active: codes[i] & INACTIVE_FLAG == 0,
                color: colors[i],
            }),
        }
    }
}

impl DpiSettings {
    pub fn mode(&self, slot: ModeSlot) -> &DpiMode {
        &self.modes[slot.index()]
    }

    /// Set a mode's DPI. Out-of-range values leave the mode unchanged.
    pub fn set_dpi(&mut self, slot: ModeSlot, dpi: i64) -> Result<()> {
        let code = safety::validate_dpi(dpi)?;
        self.modes[slot.index()].code = code;
        debug!(mode = slot.number(), dpi, code, "DPI set");
        Ok(())
    }

    pub fn set_color(&mut self, slot: ModeSlot, color: u8) {
        self.modes[slot.index()].color = color;
    }

    /// Switch a mode on or off. Returns whether the state changed.
    pub fn set_active(&mut self, slot: ModeSlot, active: bool) -> bool {
        let mode = &mut self.modes[slot.index()];
        if mode.active == active {
            debug!(mode = slot.number(), active, "DPI mode already in requested state");
            return false;
        }
        mode.active = active;
        true
    }

    /// Number of modes currently switched on.
    pub fn active_count(&self) -> u8 {
        self.modes.iter().filter(|m| m.active).count() as u8
    }

    /// Encode the 59-byte DPI configuration buffer.
    pub fn encode(&self) -> [u8; layout::dpi::LEN] {
        let mut buf = DEFAULT_DPI_DATA;
        layout::dpi::ACTIVE_COUNT.slice_mut(&mut buf)[0] = self.active_count();
        for (byte, mode) in layout::dpi::DPI_CODES
            .slice_mut(&mut buf)
            .iter_mut()
            .zip(&self.modes)
        {
            *byte = mode.wire_code();
        }
        for (byte, mode) in layout::dpi::COLORS
            .slice_mut(&mut buf)
            .iter_mut()
            .zip(&self.modes)
        {
            *byte = mode.color;
        }
        buf
    }
}

/// Polling rate and current DPI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSettings {
    pub poll_rate: u8,
    pub dpi_mode: u8,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            poll_rate: layout::modes::POLL_RATE.slice(&DEFAULT_MODES_DATA)[0],
            dpi_mode: layout::modes::DPI_MODE.slice(&DEFAULT_MODES_DATA)[0],
        }
    }
}

impl ModeSettings {
    /// Encode the 9-byte modes buffer.
    pub fn encode(&self) -> [u8; layout::modes::LEN] {
        let mut buf = DEFAULT_MODES_DATA;
        layout::modes::POLL_RATE.slice_mut(&mut buf)[0] = self.poll_rate;
        layout::modes::DPI_MODE.slice_mut(&mut buf)[0] = self.dpi_mode;
        buf
    }
}
