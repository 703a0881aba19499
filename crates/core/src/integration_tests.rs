//! Integration tests: exercise the full flow against a recording transport.
//!
//! These tests go from JSON profile text through settings, encoding and the
//! ordered transfer sequence, checking the bytes the device would receive.

#[cfg(test)]
mod tests {
    use crate::buttons::DEFAULT_TABLE;
    use crate::dpi::DEFAULT_DPI_DATA;
    use crate::error::Error;
    use crate::profile::Profile;
    use crate::settings::MouseSettings;
    use crate::transport::mock::MockTransport;
    use crate::transport::{transfer_settings, Selector};

    fn run(json: &str, transport: &MockTransport) -> crate::error::Result<usize> {
        let profile = Profile::from_json(json)?;
        let (settings, report) = MouseSettings::from_profile(&profile)?;
        transfer_settings(transport, &settings.encode())?;
        Ok(report.skipped.len())
    }

    /// Test: example configuration end to end.
    #[test]
    fn example_config_full_cycle() {
        let mock = MockTransport::new();
        let skipped = run(include_str!("../../../config.example.json"), &mock).unwrap();
        assert_eq!(skipped, 0);

        let sent = mock.sent();
        assert_eq!(sent.len(), 3);

        let (selector, dpi) = &sent[0];
        assert_eq!(*selector, Selector::DpiConfig);
        assert_eq!(dpi[2], 5);
        assert_eq!(&dpi[5..11], &[8, 16, 0x24, 0x30, 0x3C, 0x48 + 0x80]);
        assert_eq!(&dpi[44..50], &[7, 4, 0x02, 0x06, 0x03, 0x01]);

        let (selector, modes) = &sent[1];
        assert_eq!(*selector, Selector::CurrentModes);
        assert_eq!(modes[2], 3);

        let (selector, composite) = &sent[2];
        assert_eq!(*selector, Selector::MacroAndButtons);
        assert_eq!(composite[0], 0x06);
        assert_eq!(&composite[1..3], &[0x00, 0x01]);
        assert_eq!(
            &composite[3..19],
            &[
                0x32, 0xF0, 0xB2, 0xF0, 0x4E, 0xE1, 0x0D, 0x03, 0x64, 0x1E, 0x8A, 0x1E, 0x02,
                0x03, 0x81, 0xE1
            ]
        );
        assert!(composite[19..1025].iter().all(|&b| b == 0));
        // back -> key_combination, forward -> macro, dpi- -> dpi_loop
        assert_eq!(&composite[1037..1041], &[0x64, 0x01, 0x06, 0x00]);
        assert_eq!(&composite[1041..1045], &[0x95, 0x01, 0x00, 0x00]);
        assert_eq!(&composite[1049..1053], &[0x47, 0x00, 0x00, 0x00]);
        assert_eq!(&composite[1065..1105], &DEFAULT_TABLE[..]);
        assert_eq!(&composite[1105..1145], &DEFAULT_TABLE[..]);
    }

    /// Test: skipped entries never block the run.
    #[test]
    fn bad_entries_are_skipped_not_fatal() {
        let mock = MockTransport::new();
        let skipped = run(
            r#"{
                "dpi_modes": [{ "mode": 1, "dpi": 50 }],
                "buttons_functionalities": [
                    { "name": "side_btn", "fun": "disable" },
                    { "name": "left_btn", "fun": "nope" }
                ]
            }"#,
            &mock,
        )
        .unwrap();
        assert_eq!(skipped, 3);
        let sent = mock.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].1, DEFAULT_DPI_DATA.to_vec());
    }

    /// Test: overflow aborts before anything is sent.
    #[test]
    fn macro_overflow_sends_nothing() {
        let entries = vec![r#"{ "fun": 4, "fun_up": true, "delay": 1000 }"#; 256].join(",");
        let json = format!(r#"{{ "macro": {{ "entries": [{entries}] }} }}"#);
        let mock = MockTransport::new();
        let result = run(&json, &mock);
        assert!(matches!(result, Err(Error::MacroBufferFull { .. })));
        assert!(mock.sent().is_empty());
    }

    /// Test: a failing composite transfer surfaces its selector.
    #[test]
    fn composite_transfer_failure_reported() {
        let mock = MockTransport::failing_on(Selector::MacroAndButtons);
        let result = run("{}", &mock);
        match result {
            Err(Error::TransferFailed { selector, .. }) => {
                assert_eq!(selector, Selector::MacroAndButtons)
            }
            other => panic!("expected TransferFailed, got {other:?}"),
        }
        assert_eq!(mock.sent().len(), 2);
    }

    /// Test: unreadable configuration is reported as such.
    #[test]
    fn malformed_config_is_unavailable() {
        let mock = MockTransport::new();
        assert!(matches!(
            run("not json", &mock),
            Err(Error::ConfigurationUnavailable(_))
        ));
        assert!(mock.sent().is_empty());
    }
}
