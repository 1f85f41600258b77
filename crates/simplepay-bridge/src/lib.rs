//! Request/response bridge between page code and a native hybrid-app host.
//!
//! Provides:
//! - One handler per name, invocable by the native side
//! - Outbound calls that resolve with the native response
//! - The readiness handshake for both host families (ready signal or
//!   probe navigation), with work queued until the channel appears
//! - Parsing of payloads and responses delivered as serialized text

pub mod bridge;
pub mod channel;
pub mod codec;
pub mod pending;

pub use bridge::{Bridge, BridgeOptions, Readiness};
pub use channel::{BridgeHost, NativeChannel, NativeHandler, Responder};
pub use codec::{PROBE_URL, READY_EVENT};
pub use pending::PendingCall;
