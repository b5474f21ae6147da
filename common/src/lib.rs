//! Support types shared across the pagerctl workspace.
//!
//! This crate contains pure support types with no business logic - they're
//! just data that can be passed between layers.
//!
//! ## Architecture
//!
//! - **common** (this crate): Support types (error locations, secret handling)
//! - **client-core**: Protocol and state logic for the controller session
//! - **pagerctl**: Console application wiring everything together
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod error;
pub mod redacted_secret;


pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;
