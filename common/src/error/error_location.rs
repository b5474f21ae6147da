//! Call-site capture for error values.
//!
//! Every error variant in the workspace carries one of these, filled via
//! `ErrorLocation::from(Location::caller())` inside a `#[track_caller]`
//! constructor so the recorded position is the caller, not the helper.

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location as PanicLocation;

use serde::Serialize;

/// Source position an error was raised from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    pub const fn from(location: &'static PanicLocation<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

/// Renders as `[file:line:column]`, the suffix of every error message in
/// the workspace.
impl Display for ErrorLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "[{}:{}:{}]", self.file, self.line, self.column)
    }
}
