//! Macro and button-function buffer (selector 0x0306), 1145 bytes.
//!
//! | Field | Offset | Length |
//! |---|---|---|
//! | header (0x06) | 0 | 1 |
//! | macro cycle count, big-endian | 1 | 2 |
//! | macro region, zero-padded | 3 | 1022 |
//! | live button table | 1025 | 28 |
//! | disabled buttons (factory) | 1053 | 12 |
//! | factory button table | 1065 | 40 |
//! | factory button table | 1105 | 40 |
//!
//! The two trailing blocks always carry the factory table, never the live
//! bindings. The firmware expects them that way.

use crate::buttons::{ButtonBindings, DEFAULT_TABLE};
use crate::layout::composite::{
    BUTTONS, CYCLE_COUNT, DISABLED_BUTTONS, HEADER, LEN, MACRO, REPEATED_1, REPEATED_2,
};
use crate::macros::MacroProgram;
use tracing::debug;

/// Report header byte.
pub const HEADER_BYTE: u8 = 0x06;

/// Assemble the composite buffer.
pub fn build(program: &MacroProgram, bindings: &ButtonBindings) -> [u8; LEN] {
    let mut buf = [0u8; LEN];

    HEADER.slice_mut(&mut buf)[0] = HEADER_BYTE;
    CYCLE_COUNT
        .slice_mut(&mut buf)
        .copy_from_slice(&program.cycles.to_wire());

    // Zero padding after the written prefix comes from the initial fill.
    let macro_bytes = program.buffer.as_bytes();
    MACRO.slice_mut(&mut buf)[..macro_bytes.len()].copy_from_slice(macro_bytes);

    BUTTONS
        .slice_mut(&mut buf)
        .copy_from_slice(&bindings.to_bytes());
    DISABLED_BUTTONS
        .slice_mut(&mut buf)
        .copy_from_slice(&DEFAULT_TABLE[BUTTONS.len..]);
    REPEATED_1.slice_mut(&mut buf).copy_from_slice(&DEFAULT_TABLE);
    REPEATED_2.slice_mut(&mut buf).copy_from_slice(&DEFAULT_TABLE);

    debug!(
        cycles = program.cycles.0,
        macro_bytes = macro_bytes.len(),
        "Composite buffer built"
    );
    buf
}
