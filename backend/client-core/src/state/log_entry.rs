//! Backend log records as kept in the log history.

use std::fmt;
use std::time::SystemTime;

use log::Level as LogFacadeLevel;

/// Severity of a backend log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map the controller's numeric level code.
    ///
    /// Codes 1 through 5 are error through trace; anything else, including
    /// a missing code, reads as info.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => LogLevel::Error,
            Some(2) => LogLevel::Warn,
            Some(3) => LogLevel::Info,
            Some(4) => LogLevel::Debug,
            Some(5) => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    /// The matching `log` facade level, for callers that re-emit records
    /// through the local logger.
    pub fn as_log_level(self) -> LogFacadeLevel {
        match self {
            LogLevel::Error => LogFacadeLevel::Error,
            LogLevel::Warn => LogFacadeLevel::Warn,
            LogLevel::Info => LogFacadeLevel::Info,
            LogLevel::Debug => LogFacadeLevel::Debug,
            LogLevel::Trace => LogFacadeLevel::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{name}")
    }
}

/// One entry of the log history.
///
/// Covers both backend records and the client's own connect and disconnect
/// markers. The timestamp is taken when the entry is recorded, not when the
/// backend produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: SystemTime,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}] {}",
            humantime::format_rfc3339_seconds(self.timestamp),
            self.level,
            self.message
        )
    }
}
