// Unit tests for logger module initialization logic
// Tests focus on thread-safety and error handling

use crate::logger::initialize;

use std::path::PathBuf;

/// **VALUE**: Exercises the whole lifecycle of the process-global logger
/// guard in one deterministic order.
///
/// **WHY THIS MATTERS**: The guard state is global to the test process,
/// so separate tests would race each other. Running the failure first
/// pins down both behaviors: a failed first attempt reports its error,
/// and every later call returns Ok instead of panicking inside fern.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` panicking on an
/// uncreatable path, and would catch the Once or AtomicBool guards being
/// removed, making a second initialization attempt fail.
#[test]
fn given_failed_first_initialization_when_called_again_then_later_calls_return_ok() {
    // GIVEN: A path that cannot hold a log file
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: The first initialization uses the invalid path
    let first = initialize(&invalid_dir);

    // THEN: It reports the failure instead of panicking
    assert!(first.is_err(), "uncreatable log file should be an error");
    let rendered = format!("{:?}", first.unwrap_err());
    assert!(
        rendered.contains("Console"),
        "error should be the Console variant: {rendered}"
    );

    // WHEN: Initialization is attempted again, now with a valid directory
    let valid_dir = std::env::temp_dir().join("pagerctl-test-logger");
    std::fs::create_dir_all(&valid_dir).unwrap();
    let second = initialize(&valid_dir);
    let third = initialize(&valid_dir);

    // THEN: The already-called guard turns both into a warning and Ok
    assert!(second.is_ok(), "second initialization should be idempotent");
    assert!(third.is_ok(), "third initialization should be idempotent");

    // Cleanup
    std::fs::remove_dir_all(&valid_dir).ok();
}
