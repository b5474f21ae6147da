// Unit tests for backend log level mapping

use crate::state::log_entry::{LogEntry, LogLevel};

/// **VALUE**: Verifies the controller's numeric level codes map to the
/// documented severities.
///
/// **WHY THIS MATTERS**: The controller identifies severity only by code.
/// A shifted mapping would colour errors as trace chatter and bury real
/// faults in the history.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in the code table.
#[test]
fn given_known_level_codes_when_mapped_then_severities_match() {
    assert_eq!(LogLevel::from_code(Some(1)), LogLevel::Error);
    assert_eq!(LogLevel::from_code(Some(2)), LogLevel::Warn);
    assert_eq!(LogLevel::from_code(Some(3)), LogLevel::Info);
    assert_eq!(LogLevel::from_code(Some(4)), LogLevel::Debug);
    assert_eq!(LogLevel::from_code(Some(5)), LogLevel::Trace);
}

/// **VALUE**: Verifies unknown and missing codes degrade to info rather
/// than failing the record.
#[test]
fn given_unknown_level_codes_when_mapped_then_falls_back_to_info() {
    assert_eq!(LogLevel::from_code(None), LogLevel::Info);
    assert_eq!(LogLevel::from_code(Some(0)), LogLevel::Info);
    assert_eq!(LogLevel::from_code(Some(6)), LogLevel::Info);
    assert_eq!(LogLevel::from_code(Some(-1)), LogLevel::Info);
}

#[test]
fn given_log_levels_when_bridged_then_facade_levels_match() {
    assert_eq!(LogLevel::Error.as_log_level(), log::Level::Error);
    assert_eq!(LogLevel::Warn.as_log_level(), log::Level::Warn);
    assert_eq!(LogLevel::Info.as_log_level(), log::Level::Info);
    assert_eq!(LogLevel::Debug.as_log_level(), log::Level::Debug);
    assert_eq!(LogLevel::Trace.as_log_level(), log::Level::Trace);
}

/// **VALUE**: Verifies the display form carries the timestamp, severity
/// and message, which is what the console prints per history line.
#[test]
fn given_log_entry_when_displayed_then_contains_level_and_message() {
    // GIVEN: An entry with a known severity and message
    let entry = LogEntry::new(LogLevel::Warn, "transmitter offline");

    // WHEN: Formatting it
    let rendered = entry.to_string();

    // THEN: Severity and message are both present
    assert!(rendered.contains("warn"), "rendered: {rendered}");
    assert!(rendered.contains("transmitter offline"), "rendered: {rendered}");
    assert!(rendered.starts_with('['), "rendered: {rendered}");
}
