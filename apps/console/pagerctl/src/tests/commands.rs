// Unit tests for operator command parsing
// Tests focus on the page address heuristic and malformed input

use crate::commands::{ConsoleCommand, parse};

/// **VALUE**: Verifies that `page <addr> <text>` yields an explicit address.
///
/// **WHY THIS MATTERS**: The leading-integer heuristic is the only way an
/// operator targets a new receiver. If it breaks, every page goes to the
/// last used address instead of the one typed.
///
/// **BUG THIS CATCHES**: Would catch the address token being swallowed
/// into the page text, or the text losing its remaining words.
#[test]
fn given_page_with_address_when_parsed_then_address_and_text_split() {
    // GIVEN: A page command with a leading integer
    let line = "page 133701 MEET AT 0900";

    // WHEN: Parsing the line
    let command = parse(line).unwrap().unwrap();

    // THEN: The integer is the address, the rest is the text
    assert_eq!(
        command,
        ConsoleCommand::Page {
            address: Some(133701),
            text: String::from("MEET AT 0900"),
        }
    );
}

/// **VALUE**: Verifies that `page <text>` without an address parses.
///
/// **WHY THIS MATTERS**: Repeat pages to the same receiver are the common
/// case; the stored address fills in at execution time.
///
/// **BUG THIS CATCHES**: Would catch the first word of the text being
/// consumed as a failed address parse and dropped.
#[test]
fn given_page_without_address_when_parsed_then_text_is_whole_remainder() {
    // GIVEN: A page command whose first word is not an integer
    let line = "page CALL THE OFFICE";

    // WHEN: Parsing the line
    let command = parse(line).unwrap().unwrap();

    // THEN: No address, and the text keeps every word
    assert_eq!(
        command,
        ConsoleCommand::Page {
            address: None,
            text: String::from("CALL THE OFFICE"),
        }
    );
}

/// **VALUE**: Verifies that a page with an address but no text is rejected.
///
/// **WHY THIS MATTERS**: An empty transmission is never what the operator
/// meant; `page 911` is far more likely a forgotten text than a page.
///
/// **BUG THIS CATCHES**: Would catch empty page text slipping through to
/// the transmitter.
#[test]
fn given_page_with_only_address_when_parsed_then_error() {
    // GIVEN: A page command that is just an integer
    // WHEN: Parsing the line
    let result = parse("page 911");

    // THEN: The parse fails with an operator-facing message
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("text is required"));
}

/// **VALUE**: Verifies that `page` with no arguments shows usage.
#[test]
fn given_bare_page_when_parsed_then_error() {
    let result = parse("page");

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Usage"));
}

/// **VALUE**: Verifies that the auth secret survives parsing intact.
///
/// **WHY THIS MATTERS**: Secrets may contain spaces; truncating one at
/// the first space would authenticate with the wrong credential.
///
/// **BUG THIS CATCHES**: Would catch tokenizing the secret instead of
/// taking the remainder of the line.
#[test]
fn given_auth_with_spaced_secret_when_parsed_then_secret_kept_whole() {
    // GIVEN: An auth command whose secret contains a space
    let command = parse("auth open sesame").unwrap().unwrap();

    // THEN: The whole remainder is the secret
    assert_eq!(command, ConsoleCommand::Auth(String::from("open sesame")));
}

/// **VALUE**: Verifies that `auth` without a secret is rejected.
#[test]
fn given_bare_auth_when_parsed_then_error() {
    let result = parse("auth");

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Usage"));
}

/// **VALUE**: Verifies the argument-free commands and the quit alias.
///
/// **WHY THIS MATTERS**: These verbs are the whole control surface of the
/// console; a typo in the match arms would silently lose a command.
///
/// **BUG THIS CATCHES**: Would catch a verb mapped to the wrong command
/// or a removed alias.
#[test]
fn given_simple_verbs_when_parsed_then_mapped_to_commands() {
    // GIVEN/WHEN/THEN: Each verb maps to its command
    assert_eq!(parse("save").unwrap().unwrap(), ConsoleCommand::Save);
    assert_eq!(parse("reset").unwrap().unwrap(), ConsoleCommand::Reset);
    assert_eq!(parse("test").unwrap().unwrap(), ConsoleCommand::Test);
    assert_eq!(parse("status").unwrap().unwrap(), ConsoleCommand::Status);
    assert_eq!(parse("log").unwrap().unwrap(), ConsoleCommand::Log);
    assert_eq!(parse("messages").unwrap().unwrap(), ConsoleCommand::Messages);
    assert_eq!(parse("help").unwrap().unwrap(), ConsoleCommand::Help);
    assert_eq!(parse("quit").unwrap().unwrap(), ConsoleCommand::Quit);
    assert_eq!(parse("exit").unwrap().unwrap(), ConsoleCommand::Quit);
}

/// **VALUE**: Verifies that verbs are matched case-insensitively and that
/// surrounding whitespace is ignored.
#[test]
fn given_mixed_case_and_padding_when_parsed_then_verb_still_matches() {
    assert_eq!(parse("  STATUS  ").unwrap().unwrap(), ConsoleCommand::Status);
    assert_eq!(parse("Quit").unwrap().unwrap(), ConsoleCommand::Quit);
}

/// **VALUE**: Verifies that blank lines are ignored rather than rejected.
///
/// **WHY THIS MATTERS**: An operator hitting enter on an empty prompt
/// should not be shown an error.
#[test]
fn given_blank_line_when_parsed_then_no_command() {
    assert_eq!(parse("").unwrap(), None);
    assert_eq!(parse("   ").unwrap(), None);
}

/// **VALUE**: Verifies that unknown verbs report themselves.
#[test]
fn given_unknown_verb_when_parsed_then_error_names_it() {
    let result = parse("launch missiles");

    assert!(result.is_err());
    let message = result.unwrap_err();
    assert!(message.contains("launch"), "message was: {message}");
    assert!(message.contains("help"), "message was: {message}");
}
