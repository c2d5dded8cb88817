//! Transport layer between the editor surface and a session.
//!
//! Provides:
//! - Wire protocol (JSON + base64 file payloads)
//! - WebSocket transport (feature: websocket)

pub mod protocol;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use protocol::{ClientMessage, FilePayload, ServerMessage};
