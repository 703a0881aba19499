//! Button-function table and per-button binding resolution.
//!
//! Each physical button is described on the wire by 4 bytes:
//!   - byte 0: high nibble = function code, low nibble = per-button constant
//!   - bytes 1..3: function arguments
//!
//! The low nibble is fixed by the firmware for each slot and is never
//! changed by configuration; it is kept as a separate field here and only
//! merged with the function code when serializing.

use crate::error::{Error, Result};
use crate::layout::{BUTTON_COUNT, BUTTON_SIZE, DISABLED_BUTTON_COUNT};
use tracing::debug;

/// Factory button table: 7 live buttons followed by 3 disabled slots.
pub const DEFAULT_TABLE: [u8; (BUTTON_COUNT + DISABLED_BUTTON_COUNT) * BUTTON_SIZE] = [
    0x11, 0xF0, 0x00, 0x00, // left
    0x12, 0xF1, 0x00, 0x00, // right
    0x13, 0xF2, 0x00, 0x00, // middle
    0x14, 0xF3, 0x00, 0x00, // back
    0x15, 0xF4, 0x00, 0x00, // forward
    0x46, 0x20, 0x00, 0x00, // dpi+
    0x47, 0x40, 0x00, 0x00, // dpi-
    0x58, 0x01, 0x00, 0x00, // disabled
    0x59, 0x01, 0x00, 0x00, // disabled
    0x5A, 0x01, 0x00, 0x00, // disabled
];

/// Physical mouse buttons, in wire order.
///
/// The discriminant is the slot index in the button table; reordering the
/// variants would remap every binding onto the wrong button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left = 0,
    Right = 1,
    Middle = 2,
    /// Side button closer to the user.
    Back = 3,
    /// Side button further from the user.
    Forward = 4,
    /// Top button closer to the scroll wheel.
    DpiUp = 5,
    DpiDown = 6,
}

impl Button {
    /// All buttons in wire order.
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Left,
        Button::Right,
        Button::Middle,
        Button::Back,
        Button::Forward,
        Button::DpiUp,
        Button::DpiDown,
    ];

    /// Name used for this button in configuration files.
    pub fn config_name(&self) -> &'static str {
        match self {
            Self::Left => "left_btn",
            Self::Right => "right_btn",
            Self::Middle => "middle_btn",
            Self::Back => "back_btn",
            Self::Forward => "forward_btn",
            Self::DpiUp => "dpi_p_btn",
            Self::DpiDown => "dpi_n_btn",
        }
    }

    /// Resolve a configuration button name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.config_name() == name)
            .ok_or_else(|| Error::UnknownButtonName(name.to_string()))
    }

    /// Slot index in the button table.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Where a function's argument bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSource {
    /// First argument byte is hardcoded; configuration arguments are ignored.
    Fixed(u8),
    /// All three argument bytes come from configuration.
    User,
}

/// One entry of the button-function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonFunction {
    pub name: &'static str,
    /// 4-bit function code (high nibble of the wire byte).
    pub code: u8,
    pub args: ArgSource,
}

impl ButtonFunction {
    const fn fixed(name: &'static str, code: u8, arg: u8) -> Self {
        Self {
            name,
            code,
            args: ArgSource::Fixed(arg),
        }
    }

    const fn user(name: &'static str, code: u8) -> Self {
        Self {
            name,
            code,
            args: ArgSource::User,
        }
    }

    /// Look up a function by its configuration name.
    pub fn lookup(name: &str) -> Result<&'static ButtonFunction> {
        FUNCTIONS
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::UnknownFunctionName(name.to_string()))
    }
}

/// Number of leading table entries whose arguments are hardcoded.
pub const FIXED_ARG_FUNCTION_COUNT: usize = 10;

/// All recognized button functions.
///
/// The first [`FIXED_ARG_FUNCTION_COUNT`] entries take hardcoded arguments,
/// the remaining ones take arguments from configuration.
pub const FUNCTIONS: [ButtonFunction; 14] = [
    ButtonFunction::fixed("left_btn", 0x1, 0xF0),
    ButtonFunction::fixed("right_btn", 0x1, 0xF1),
    ButtonFunction::fixed("middle_btn", 0x1, 0xF2),
    ButtonFunction::fixed("back_btn", 0x1, 0xF3),
    ButtonFunction::fixed("forward_btn", 0x1, 0xF4),
    ButtonFunction::fixed("dpi_p_btn", 0x4, 0x20),
    ButtonFunction::fixed("dpi_n_btn", 0x4, 0x40),
    ButtonFunction::fixed("dpi_loop", 0x4, 0x00),
    ButtonFunction::fixed("three_click", 0x3, 0x01),
    ButtonFunction::fixed("disable", 0x5, 0x01),
    ButtonFunction::user("fire_key", 0x2),
    ButtonFunction::user("dpi_lock", 0x4),
    ButtonFunction::user("key_combination", 0x6),
    ButtonFunction::user("macro", 0x9),
];

const fn table_is_partitioned() -> bool {
    let mut i = 0;
    while i < FUNCTIONS.len() {
        let fixed = matches!(FUNCTIONS[i].args, ArgSource::Fixed(_));
        if fixed != (i < FIXED_ARG_FUNCTION_COUNT) || FUNCTIONS[i].code > 0x0F {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(table_is_partitioned());

/// A single button's function assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBinding {
    /// 4-bit function code.
    pub function: u8,
    reserved: u8,
    pub args: [u8; 3],
}

impl ButtonBinding {
    /// Decode a 4-byte wire entry.
    pub fn from_bytes(bytes: [u8; BUTTON_SIZE]) -> Self {
        Self {
            function: bytes[0] >> 4,
            reserved: bytes[0] & 0x0F,
            args: [bytes[1], bytes[2], bytes[3]],
        }
    }

    /// Encode to the 4-byte wire entry.
    pub fn to_bytes(&self) -> [u8; BUTTON_SIZE] {
        [
            (self.function << 4) | self.reserved,
            self.args[0],
            self.args[1],
            self.args[2],
        ]
    }

    /// Per-slot constant low nibble.
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    /// Assign a function. `user_args` is used only by user-argument functions.
    pub fn assign(&mut self, function: &ButtonFunction, user_args: [u8; 3]) {
        self.function = function.code;
        self.args = match function.args {
            ArgSource::Fixed(arg) => [arg, 0x00, 0x00],
            ArgSource::User => user_args,
        };
    }
}

/// The live binding table for all physical buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonBindings([ButtonBinding; BUTTON_COUNT]);

impl Default for ButtonBindings {
    fn default() -> Self {
        Self(std::array::from_fn(default_binding))
    }
}

impl ButtonBindings {
    pub fn get(&self, button: Button) -> &ButtonBinding {
        &self.0[button.index()]
    }

    /// Resolve `function_name` and assign it to `button`.
    ///
    /// On an unknown name the binding is left untouched.
    pub fn bind(&mut self, button: Button, function_name: &str, user_args: [u8; 3]) -> Result<()> {
        let function = ButtonFunction::lookup(function_name)?;
        self.set(button, function, user_args);
        Ok(())
    }

    /// Assign an already resolved function to `button`.
    pub fn set(&mut self, button: Button, function: &ButtonFunction, user_args: [u8; 3]) {
        let binding = &mut self.0[button.index()];
        binding.assign(function, user_args);
        debug!(
            button = %button,
            function = function.name,
            wire = format_args!("{:02X?}", binding.to_bytes()),
            "Button bound"
        );
    }

    /// Serialize all live bindings in wire order.
    pub fn to_bytes(&self) -> [u8; BUTTON_COUNT * BUTTON_SIZE] {
        let mut out = [0u8; BUTTON_COUNT * BUTTON_SIZE];
        for (chunk, binding) in out.chunks_exact_mut(BUTTON_SIZE).zip(&self.0) {
            chunk.copy_from_slice(&binding.to_bytes());
        }
        out
    }
}

fn default_binding(slot: usize) -> ButtonBinding {
    let start = slot * BUTTON_SIZE;
    let mut bytes = [0u8; BUTTON_SIZE];
    bytes.copy_from_slice(&DEFAULT_TABLE[start..start + BUTTON_SIZE]);
    ButtonBinding::from_bytes(bytes)
}
