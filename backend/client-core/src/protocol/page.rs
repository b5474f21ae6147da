//! Page submission requests.
//!
//! A page targets a single POCSAG receiver identity code and carries either
//! alphanumeric or numeric data. Field names on the wire follow the
//! controller's schema (`addr`, `type`, `message`), so the serde renames
//! here are load-bearing.

use crate::error::page::PageError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Highest addressable POCSAG receiver identity code (21 bits).
pub const POCSAG_ADDRESS_MAX: u32 = 0x1F_FFFF;
/// POCSAG function bits are two wide.
pub const PAGE_FUNC_MAX: u8 = 3;
/// Baud rates the transmitter accepts.
pub const PAGE_SPEEDS: [u32; 3] = [512, 1200, 2400];

const DEFAULT_ID: &str = "test";
const DEFAULT_PROTOCOL: &str = "pocsag";
const DEFAULT_PRIORITY: u8 = 5;
const DEFAULT_SPEED: u32 = 1200;
const DEFAULT_FUNC: u8 = 3;

/// Encoding of the page data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Numeric,
    AlphaNum,
}

/// The transmission parameters and data of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(rename = "addr")]
    pub address: u32,
    pub speed: u32,
    #[serde(rename = "type")]
    pub kind: PageKind,
    pub func: u8,
    pub data: String,
}

/// A complete page submission as sent in [`ClientEnvelope::SendMessage`].
///
/// [`ClientEnvelope::SendMessage`]: crate::protocol::ClientEnvelope::SendMessage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub id: String,
    pub protocol: String,
    pub priority: u8,
    #[serde(rename = "message")]
    pub payload: PagePayload,
}

impl PageRequest {
    pub fn builder() -> PageRequestBuilder {
        PageRequestBuilder::default()
    }
}

/// Builder for validated [`PageRequest`] instances.
///
/// Only the receiver address must be supplied; every other field has a
/// controller-compatible default.
#[derive(Debug, Default)]
pub struct PageRequestBuilder {
    id: Option<String>,
    protocol: Option<String>,
    priority: Option<u8>,
    address: Option<u32>,
    speed: Option<u32>,
    kind: Option<PageKind>,
    func: Option<u8>,
    data: Option<String>,
}

impl PageRequestBuilder {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_address(mut self, address: u32) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_kind(mut self, kind: PageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_func(mut self, func: u8) -> Self {
        self.func = Some(func);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Build the PageRequest with validation.
    #[track_caller]
    pub fn build(self) -> Result<PageRequest, PageError> {
        let address = self.address.ok_or_else(|| PageError::Validation {
            message: String::from("Receiver address is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if address > POCSAG_ADDRESS_MAX {
            return Err(PageError::Validation {
                message: format!("Receiver address {address} exceeds {POCSAG_ADDRESS_MAX}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let id = self.id.unwrap_or_else(|| String::from(DEFAULT_ID));
        if id.is_empty() {
            return Err(PageError::Validation {
                message: String::from("Page id cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let protocol = self
            .protocol
            .unwrap_or_else(|| String::from(DEFAULT_PROTOCOL));
        if protocol.is_empty() {
            return Err(PageError::Validation {
                message: String::from("Protocol cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let speed = self.speed.unwrap_or(DEFAULT_SPEED);
        if !PAGE_SPEEDS.contains(&speed) {
            return Err(PageError::Validation {
                message: format!("Unsupported baud rate: {speed}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let func = self.func.unwrap_or(DEFAULT_FUNC);
        if func > PAGE_FUNC_MAX {
            return Err(PageError::Validation {
                message: format!("Function bits {func} exceed {PAGE_FUNC_MAX}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(PageRequest {
            id,
            protocol,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            payload: PagePayload {
                address,
                speed,
                kind: self.kind.unwrap_or(PageKind::AlphaNum),
                func,
                data: self.data.unwrap_or_default(),
            },
        })
    }
}
