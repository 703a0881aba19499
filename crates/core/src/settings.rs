//! Per-run device settings.
//!
//! [`MouseSettings`] starts from the factory defaults, absorbs a
//! [`Profile`], and encodes the three buffers sent to the device.
//!
//! Entry-level problems (unknown names, bad values, missing keys)
//! skip only the offending entry or field and are collected in an
//! [`ApplyReport`]. Running out of macro space is fatal.

use crate::buttons::{ArgSource, Button, ButtonBindings, ButtonFunction};
use crate::composite;
use crate::dpi::{DpiSettings, ModeSettings, ModeSlot};
use crate::error::{Error, Result};
use crate::layout;
use crate::macros::{CycleCount, MacroEntry, MacroProgram};
use crate::profile::{
    ButtonConfig, DpiModeConfig, MacroConfig, MacroEntryConfig, Profile, Setting,
    DEFAULT_MACRO_DELAY_MS,
};
use crate::safety;
use crate::transport::Selector;
use tracing::{info, warn};

/// Entries that were skipped while applying a profile.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub skipped: Vec<Error>,
}

impl ApplyReport {
    /// Whether every entry applied cleanly.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, section: &'static str, index: usize, error: Error) {
        warn!(section, entry = index, %error, "Skipping configuration entry");
        self.skipped.push(error);
    }
}

/// The three wire buffers, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBuffers {
    pub dpi: [u8; layout::dpi::LEN],
    pub modes: [u8; layout::modes::LEN],
    pub composite: [u8; layout::composite::LEN],
}

impl EncodedBuffers {
    /// Buffers paired with their selector, in transfer order.
    pub fn frames(&self) -> [(Selector, &[u8]); 3] {
        [
            (Selector::DpiConfig, &self.dpi[..]),
            (Selector::CurrentModes, &self.modes[..]),
            (Selector::MacroAndButtons, &self.composite[..]),
        ]
    }
}

/// Everything configurable on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MouseSettings {
    pub dpi: DpiSettings,
    pub modes: ModeSettings,
    pub buttons: ButtonBindings,
    pub macro_program: MacroProgram,
}

impl MouseSettings {
    /// Factory defaults with `profile` applied on top.
    pub fn from_profile(profile: &Profile) -> Result<(Self, ApplyReport)> {
        let mut settings = Self::default();
        let report = settings.apply_profile(profile)?;
        Ok((settings, report))
    }

    /// Apply a profile. Only macro buffer overflow is returned as an error.
    pub fn apply_profile(&mut self, profile: &Profile) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        if let Some(rate) = &profile.poll_rate {
            let rate = rate
                .get("poll_rate")
                .and_then(|rate| safety::validate_byte("poll_rate", rate));
            match rate {
                Ok(rate) => self.modes.poll_rate = rate,
                Err(e) => report.skip("poll_rate", 0, e),
            }
        }

        for (i, entry) in profile.dpi_modes.iter().enumerate() {
            self.apply_dpi_mode(entry, i, &mut report);
        }

        for (i, entry) in profile.buttons_functionalities.iter().enumerate() {
            if let Err(e) = self.apply_button(entry) {
                report.skip("buttons_functionalities", i, e);
            }
        }

        if let Some(macro_config) = &profile.macro_config {
            self.apply_macro(macro_config, &mut report)?;
        }

        info!(skipped = report.skipped.len(), "Profile applied");
        Ok(report)
    }

    fn apply_dpi_mode(&mut self, entry: &DpiModeConfig, index: usize, report: &mut ApplyReport) {
        const SECTION: &str = "dpi_modes";

        let slot = match required(&entry.mode, SECTION, "mode").and_then(ModeSlot::from_config) {
            Ok(slot) => slot,
            Err(e) => return report.skip(SECTION, index, e),
        };

        if let Some(dpi) = &entry.dpi {
            if let Err(e) = dpi.get("dpi").and_then(|dpi| self.dpi.set_dpi(slot, dpi)) {
                report.skip(SECTION, index, e);
            }
        }
        if let Some(color) = &entry.color {
            let color = color
                .get("color")
                .and_then(|color| safety::validate_byte("color", color));
            match color {
                Ok(color) => self.dpi.set_color(slot, color),
                Err(e) => report.skip(SECTION, index, e),
            }
        }
        if let Some(active) = &entry.active {
            match active.get("active") {
                Ok(active) => {
                    self.dpi.set_active(slot, active > 0);
                }
                Err(e) => report.skip(SECTION, index, e),
            }
        }
    }

    fn apply_button(&mut self, entry: &ButtonConfig) -> Result<()> {
        const SECTION: &str = "buttons_functionalities";

        let name = required(&entry.name, SECTION, "name")?;
        let button = Button::from_name(&name)?;
        let fun = required(&entry.fun, SECTION, "fun")?;
        let function = ButtonFunction::lookup(&fun)?;

        let args = match function.args {
            ArgSource::Fixed(_) => [0; 3],
            ArgSource::User => {
                let [a1, a2, a3] = entry.args()?;
                [
                    safety::validate_byte("arg1", a1)?,
                    safety::validate_byte("arg2", a2)?,
                    safety::validate_byte("arg3", a3)?,
                ]
            }
        };
        self.buttons.set(button, function, args);
        Ok(())
    }

    fn apply_macro(&mut self, config: &MacroConfig, report: &mut ApplyReport) -> Result<()> {
        const SECTION: &str = "macro";

        self.macro_program.cycles = match &config.num_of_cycles {
            Some(n) => match n
                .get("num_of_cycles")
                .and_then(|n| safety::validate_u16("num_of_cycles", n))
            {
                Ok(n) => CycleCount(n),
                Err(e) => {
                    report.skip(SECTION, 0, e);
                    CycleCount::default()
                }
            },
            None => CycleCount::default(),
        };

        for (i, entry) in config.entries.iter().enumerate() {
            match macro_entry(entry) {
                Ok(entry) => self.macro_program.buffer.push(&entry)?,
                Err(e) => report.skip(SECTION, i, e),
            }
        }
        Ok(())
    }

    /// Encode all three buffers.
    pub fn encode(&self) -> EncodedBuffers {
        EncodedBuffers {
            dpi: self.dpi.encode(),
            modes: self.modes.encode(),
            composite: composite::build(&self.macro_program, &self.buttons),
        }
    }
}

/// A present, well-typed value, or the error that skips its entry.
fn required<T: Clone>(
    setting: &Option<Setting<T>>,
    entry: &'static str,
    field: &'static str,
) -> Result<T> {
    setting
        .as_ref()
        .ok_or(Error::MissingField { entry, field })?
        .get(field)
}

fn macro_entry(entry: &MacroEntryConfig) -> Result<MacroEntry> {
    let fun = safety::validate_byte("fun", required(&entry.fun, "macro", "fun")?)?;
    let fun_up = required(&entry.fun_up, "macro", "fun_up")?.is_release();
    let delay = match &entry.delay {
        Some(delay) => delay.get("delay")?,
        None => DEFAULT_MACRO_DELAY_MS,
    };
    MacroEntry::new(fun, fun_up, delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::DEFAULT_TABLE;
    use crate::dpi::{DEFAULT_DPI_DATA, DEFAULT_MODES_DATA};

    fn apply(json: &str) -> (MouseSettings, ApplyReport) {
        MouseSettings::from_profile(&Profile::from_json(json).unwrap()).unwrap()
    }

    #[test]
    fn empty_profile_keeps_factory_buffers() {
        let (settings, report) = apply("{}");
        assert!(report.is_clean());
        let buffers = settings.encode();
        assert_eq!(buffers.dpi, DEFAULT_DPI_DATA);
        assert_eq!(buffers.modes, DEFAULT_MODES_DATA);
        assert_eq!(&buffers.composite[1025..1065], &DEFAULT_TABLE[..]);
    }

    #[test]
    fn deactivated_mode_with_quantized_dpi() {
        let (settings, report) = apply(r#"{ "dpi_modes": [{ "mode": 1, "dpi": 1260, "active": 0 }] }"#);
        assert!(report.is_clean());
        let dpi = settings.encode().dpi;
        assert_eq!(dpi[5], 0x8C);
        assert_eq!(dpi[2], DEFAULT_DPI_DATA[2] - 1);
    }

    #[test]
    fn bad_dpi_skips_only_that_field() {
        let (settings, report) =
            apply(r#"{ "dpi_modes": [{ "mode": 2, "dpi": 9000, "color": 3 }] }"#);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0], Error::DpiOutOfRange(9000)));
        let dpi = settings.encode().dpi;
        assert_eq!(dpi[6], DEFAULT_DPI_DATA[6]);
        assert_eq!(dpi[45], 3);
    }

    #[test]
    fn bad_mode_index_skips_entry() {
        let (settings, report) = apply(
            r#"{ "dpi_modes": [{ "mode": 7, "dpi": 800 }, { "dpi": 800 }, { "mode": 3, "dpi": 900 }] }"#,
        );
        assert_eq!(report.skipped.len(), 2);
        let dpi = settings.encode().dpi;
        assert_eq!(dpi[7], 9);
        assert_eq!(&dpi[5..7], &DEFAULT_DPI_DATA[5..7]);
    }

    #[test]
    fn repeated_deactivation_counts_once() {
        let (settings, _) = apply(
            r#"{ "dpi_modes": [{ "mode": 5, "active": 0 }, { "mode": 5, "active": -1 }] }"#,
        );
        let dpi = settings.encode().dpi;
        assert_eq!(dpi[2], 5);
        assert_eq!(dpi[9], 0x3C + 0x80);
    }

    #[test]
    fn unknown_button_name_skipped_others_apply() {
        let (settings, report) = apply(
            r#"{ "buttons_functionalities": [
                { "name": "side_btn", "fun": "disable" },
                { "name": "middle_btn", "fun": "disable" },
                { "name": "right_btn", "fun": "warp" },
                { "name": "left_btn", "fun": "fire_key", "arg1": 4, "arg2": 10 }
            ] }"#,
        );
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(report.skipped[0], Error::UnknownButtonName(_)));
        assert!(matches!(report.skipped[1], Error::UnknownFunctionName(_)));

        let composite = settings.encode().composite;
        assert_eq!(&composite[1025..1029], &[0x21, 0x04, 0x0A, 0x00]);
        assert_eq!(&composite[1029..1033], &DEFAULT_TABLE[4..8]);
        assert_eq!(&composite[1033..1037], &[0x53, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn fixed_function_ignores_out_of_range_args() {
        let (settings, report) = apply(
            r#"{ "buttons_functionalities": [{ "name": "back_btn", "fun": "three_click", "arg1": 999 }] }"#,
        );
        assert!(report.is_clean());
        assert_eq!(
            settings.buttons.get(Button::Back).to_bytes(),
            [0x34, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn user_function_rejects_wide_args() {
        let (settings, report) = apply(
            r#"{ "buttons_functionalities": [{ "name": "back_btn", "fun": "macro", "arg1": 300 }] }"#,
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(settings.buttons, ButtonBindings::default());
    }

    #[test]
    fn macro_entries_packed_in_order() {
        let (settings, report) = apply(
            r#"{ "macro": { "num_of_cycles": 2, "entries": [
                { "fun": 240, "fun_up": false, "delay": 50 },
                { "fun": 240, "fun_up": true, "delay": 50 }
            ] } }"#,
        );
        assert!(report.is_clean());
        let composite = settings.encode().composite;
        assert_eq!(&composite[1..3], &[0x00, 0x02]);
        assert_eq!(&composite[3..7], &[0x32, 0xF0, 0xB2, 0xF0]);
        assert!(composite[7..1025].iter().all(|&b| b == 0));
    }

    #[test]
    fn incomplete_macro_entries_skipped_and_delay_defaults() {
        let (settings, report) = apply(
            r#"{ "macro": { "entries": [
                { "fun_up": true, "delay": 5 },
                { "fun": 30, "delay": 5 },
                { "fun": 30, "fun_up": true, "delay": 0 },
                { "fun": 30, "fun_up": true }
            ] } }"#,
        );
        assert_eq!(report.skipped.len(), 3);
        assert!(matches!(report.skipped[2], Error::InvalidDelay(0)));
        assert_eq!(settings.macro_program.buffer.as_bytes(), &[0x81, 0x1E]);
        assert_eq!(settings.macro_program.cycles, CycleCount(0));
    }

    #[test]
    fn macro_overflow_is_fatal() {
        let entries: Vec<String> = (0..300)
            .map(|_| r#"{ "fun": 4, "fun_up": false, "delay": 500 }"#.to_string())
            .collect();
        let json = format!(r#"{{ "macro": {{ "entries": [{}] }} }}"#, entries.join(","));
        let profile = Profile::from_json(&json).unwrap();
        let result = MouseSettings::from_profile(&profile);
        assert!(matches!(result, Err(Error::MacroBufferFull { .. })));
    }

    #[test]
    fn mistyped_field_skipped_rest_of_file_applies() {
        let (settings, report) = apply(
            r#"{
                "poll_rate": 1,
                "dpi_modes": [{ "mode": 1, "dpi": "800", "color": 2 }, { "mode": 2, "dpi": 1600 }],
                "buttons_functionalities": [
                    { "name": 7, "fun": "disable" },
                    { "name": "back_btn", "fun": "macro", "arg1": "one" },
                    { "name": "forward_btn", "fun": "dpi_loop" }
                ],
                "macro": { "num_of_cycles": "twice", "entries": [
                    { "fun": 30, "fun_up": false, "delay": "fast" },
                    { "fun": 30, "fun_up": 1, "delay": 5 }
                ] }
            }"#,
        );
        assert_eq!(report.skipped.len(), 5);
        assert!(report
            .skipped
            .iter()
            .all(|e| matches!(e, Error::MistypedField { .. })));

        let buffers = settings.encode();
        assert_eq!(buffers.modes[2], 0x01);
        assert_eq!(buffers.dpi[5], DEFAULT_DPI_DATA[5]);
        assert_eq!(buffers.dpi[44], 2);
        assert_eq!(buffers.dpi[6], 16);
        assert_eq!(
            settings.buttons.get(Button::Back).to_bytes(),
            [0x14, 0xF3, 0x00, 0x00]
        );
        assert_eq!(
            settings.buttons.get(Button::Forward).to_bytes(),
            [0x45, 0x00, 0x00, 0x00]
        );
        assert_eq!(settings.macro_program.cycles, CycleCount(0));
        assert_eq!(settings.macro_program.buffer.as_bytes(), &[0x85, 0x1E]);
    }

    #[test]
    fn poll_rate_copied_through() {
        let (settings, _) = apply(r#"{ "poll_rate": 1 }"#);
        assert_eq!(settings.encode().modes[2], 0x01);

        let (settings, report) = apply(r#"{ "poll_rate": 512 }"#);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(settings.encode().modes, DEFAULT_MODES_DATA);
    }
}
