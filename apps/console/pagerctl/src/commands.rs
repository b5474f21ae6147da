//! Operator command parsing.
//!
//! One line of input maps to one [`ConsoleCommand`]. Parsing is purely
//! textual; validation that needs state (stored addresses, connection
//! status) happens where the command is executed.

/// Help text printed at startup and for the `help` command.
pub const USAGE: &str = "\
Commands:
  auth <secret>        present an operator secret to the controller
  page <addr> <text>   transmit a page to the given receiver address
  page <text>          transmit a page to the last used address
  save                 send the mirrored configuration back to the controller
  reset                restore the controller's default configuration
  test                 trigger a test transmission
  status               show connection, version, timeslot and telemetry
  log                  show the controller log history, newest first
  messages             show received messages, newest first
  help                 show this help
  quit                 exit";

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Auth(String),
    Page { address: Option<u32>, text: String },
    Save,
    Reset,
    Test,
    Status,
    Log,
    Messages,
    Help,
    Quit,
}

/// Parse one input line.
///
/// Returns `Ok(None)` for blank lines and `Err` with an operator-facing
/// message for malformed input.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, remainder) = match line.split_once(char::is_whitespace) {
        Some((verb, remainder)) => (verb, remainder.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "auth" => {
            if remainder.is_empty() {
                return Err(String::from("Usage: auth <secret>"));
            }
            ConsoleCommand::Auth(remainder.to_owned())
        }
        "page" => parse_page(remainder)?,
        "save" => ConsoleCommand::Save,
        "reset" => ConsoleCommand::Reset,
        "test" => ConsoleCommand::Test,
        "status" => ConsoleCommand::Status,
        "log" => ConsoleCommand::Log,
        "messages" => ConsoleCommand::Messages,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        unknown => return Err(format!("Unknown command: {unknown} (try 'help')")),
    };

    Ok(Some(command))
}

/// Parse the arguments of a `page` command.
///
/// A leading integer is the receiver address; without one the page goes
/// to the last used address.
fn parse_page(arguments: &str) -> Result<ConsoleCommand, String> {
    if arguments.is_empty() {
        return Err(String::from("Usage: page [<addr>] <text>"));
    }

    let (address, text) = match arguments.split_once(char::is_whitespace) {
        Some((first, rest)) => match first.parse::<u32>() {
            Ok(address) => (Some(address), rest.trim()),
            Err(_) => (None, arguments),
        },
        None => match arguments.parse::<u32>() {
            Ok(address) => (Some(address), ""),
            Err(_) => (None, arguments),
        },
    };

    if text.is_empty() {
        return Err(String::from("Page text is required"));
    }

    Ok(ConsoleCommand::Page {
        address,
        text: text.to_owned(),
    })
}
