// Unit tests for the crate-level error type

use crate::error::ClientError;
use crate::error::connection::ConnectionError;
use crate::error::page::PageError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that concern-specific errors wrap into [`ClientError`]
/// without changing their message.
///
/// **WHY THIS MATTERS**: Callers holding the crate-level error must still
/// see the underlying cause; a wrapper that prefixes or rewrites the
/// message would bury it.
///
/// **BUG THIS CATCHES**: Would catch the transparent attribute being
/// dropped from a variant, which would replace the cause with a generic
/// wrapper message.
#[test]
fn given_concern_errors_when_wrapped_then_display_passes_through() {
    // GIVEN: Errors from two different concerns
    let connection = ConnectionError::NotConnected {
        message: String::from("Cannot send Test: no open controller connection"),
        location: ErrorLocation::from(Location::caller()),
    };
    let page = PageError::Validation {
        message: String::from("Receiver address is required"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Wrapping them into the crate-level error
    let wrapped_connection = ClientError::from(connection);
    let wrapped_page = ClientError::from(page);

    // THEN: Each renders exactly as its source did
    assert!(
        wrapped_connection
            .to_string()
            .starts_with("Not Connected: Cannot send Test")
    );
    assert!(
        wrapped_page
            .to_string()
            .starts_with("Page Validation Error: Receiver address is required")
    );
}
