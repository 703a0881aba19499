//! Byte layouts of the three configuration buffers.
//!
//! Each buffer is described as a table of [`Field`]s. Writers address the
//! buffer only through these descriptors, and the tables are checked at
//! compile time to tile their buffer exactly (no gaps, no overlap).
//!
//! Offsets are 0-based.

/// A contiguous region of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub len: usize,
}

impl Field {
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Borrow the field's bytes from `buf`.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.offset..self.end()]
    }

    /// Mutably borrow the field's bytes from `buf`.
    pub fn slice_mut<'a>(&self, buf: &'a mut [u8]) -> &'a mut [u8] {
        &mut buf[self.offset..self.end()]
    }
}

/// Whether `fields`, taken in order, cover `0..total` with no gap or overlap.
pub const fn tiles(fields: &[Field], total: usize) -> bool {
    let mut cursor = 0;
    let mut i = 0;
    while i < fields.len() {
        if fields[i].offset != cursor {
            return false;
        }
        cursor += fields[i].len;
        i += 1;
    }
    cursor == total
}

/// Number of DPI mode slots.
pub const DPI_MODE_COUNT: usize = 6;
/// Number of physical buttons carried in the live binding table.
pub const BUTTON_COUNT: usize = 7;
/// Number of trailing always-disabled button slots.
pub const DISABLED_BUTTON_COUNT: usize = 3;
/// Bytes per serialized button binding.
pub const BUTTON_SIZE: usize = 4;
/// Capacity of the macro region.
pub const MAX_MACRO_SIZE: usize = 1022;

/// DPI configuration buffer (selector 0x0304).
pub mod dpi {
    use super::{Field, DPI_MODE_COUNT};

    pub const LEN: usize = 59;

    pub const PREFIX: Field = Field::new(0, 2);
    pub const ACTIVE_COUNT: Field = Field::new(2, 1);
    pub const GAP_1: Field = Field::new(3, 2);
    pub const DPI_CODES: Field = Field::new(5, DPI_MODE_COUNT);
    pub const GAP_2: Field = Field::new(11, 33);
    pub const COLORS: Field = Field::new(44, DPI_MODE_COUNT);
    pub const SUFFIX: Field = Field::new(50, 9);

    pub const FIELDS: [Field; 7] = [
        PREFIX,
        ACTIVE_COUNT,
        GAP_1,
        DPI_CODES,
        GAP_2,
        COLORS,
        SUFFIX,
    ];
}

/// Current modes buffer (selector 0x0308).
pub mod modes {
    use super::Field;

    pub const LEN: usize = 9;

    pub const PREFIX: Field = Field::new(0, 2);
    pub const POLL_RATE: Field = Field::new(2, 1);
    pub const GAP: Field = Field::new(3, 2);
    pub const DPI_MODE: Field = Field::new(5, 1);
    pub const SUFFIX: Field = Field::new(6, 3);

    pub const FIELDS: [Field; 5] = [PREFIX, POLL_RATE, GAP, DPI_MODE, SUFFIX];
}

/// Macro and button-function buffer (selector 0x0306).
pub mod composite {
    use super::{Field, BUTTON_COUNT, BUTTON_SIZE, DISABLED_BUTTON_COUNT, MAX_MACRO_SIZE};

    pub const LEN: usize = 1145;

    const BUTTONS_LEN: usize = BUTTON_COUNT * BUTTON_SIZE;
    const DISABLED_LEN: usize = DISABLED_BUTTON_COUNT * BUTTON_SIZE;
    const BLOCK_LEN: usize = BUTTONS_LEN + DISABLED_LEN;

    pub const HEADER: Field = Field::new(0, 1);
    pub const CYCLE_COUNT: Field = Field::new(1, 2);
    pub const MACRO: Field = Field::new(3, MAX_MACRO_SIZE);
    pub const BUTTONS: Field = Field::new(1025, BUTTONS_LEN);
    pub const DISABLED_BUTTONS: Field = Field::new(1053, DISABLED_LEN);
    pub const REPEATED_1: Field = Field::new(1065, BLOCK_LEN);
    pub const REPEATED_2: Field = Field::new(1105, BLOCK_LEN);

    pub const FIELDS: [Field; 7] = [
        HEADER,
        CYCLE_COUNT,
        MACRO,
        BUTTONS,
        DISABLED_BUTTONS,
        REPEATED_1,
        REPEATED_2,
    ];
}

const _: () = assert!(tiles(&dpi::FIELDS, dpi::LEN));
const _: () = assert!(tiles(&modes::FIELDS, modes::LEN));
const _: () = assert!(tiles(&composite::FIELDS, composite::LEN));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_offsets_match_device_table() {
        let expected = [
            (0, 1),
            (1, 2),
            (3, 1022),
            (1025, 28),
            (1053, 12),
            (1065, 40),
            (1105, 40),
        ];
        for (field, (offset, len)) in composite::FIELDS.iter().zip(expected) {
            assert_eq!((field.offset, field.len), (offset, len));
        }
        assert_eq!(composite::REPEATED_2.end(), composite::LEN);
    }

    #[test]
    fn tiles_detects_gap_and_overlap() {
        let gap = [Field::new(0, 2), Field::new(3, 1)];
        assert!(!tiles(&gap, 4));

        let overlap = [Field::new(0, 2), Field::new(1, 3)];
        assert!(!tiles(&overlap, 4));

        let short = [Field::new(0, 2)];
        assert!(!tiles(&short, 4));

        let exact = [Field::new(0, 2), Field::new(2, 2)];
        assert!(tiles(&exact, 4));
    }

    #[test]
    fn field_slices_address_expected_bytes() {
        let mut buf = [0u8; dpi::LEN];
        dpi::DPI_CODES.slice_mut(&mut buf).fill(0xAA);
        assert_eq!(buf[4], 0x00);
        assert_eq!(&buf[5..11], &[0xAA; 6]);
        assert_eq!(buf[11], 0x00);
        assert_eq!(dpi::DPI_CODES.slice(&buf).len(), DPI_MODE_COUNT);
    }
}
