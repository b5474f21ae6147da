//! Wire protocol shared with the transmitter controller.
//!
//! Everything on the socket is JSON text frames. Outbound requests are
//! externally tagged ([`ClientEnvelope`]); inbound frames are objects that
//! may carry several message kinds at once and decode to a list of
//! [`ServerFrame`] values.

pub mod envelope;
pub mod frame;
pub mod page;
pub mod telemetry;

pub use envelope::ClientEnvelope;
pub use frame::{LogRecord, ServerFrame, decode_frames};
pub use page::{PageKind, PagePayload, PageRequest, PageRequestBuilder};
pub use telemetry::Telemetry;

/// Controller configuration document, mirrored verbatim.
///
/// The client never inspects individual settings; the document is held as
/// opaque JSON and replaced wholesale.
pub type ConfigDocument = serde_json::Value;
