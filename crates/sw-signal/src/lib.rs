//! Handshake exchange for a serverless peer connection: JSON values are
//! compressed, carried over the stop-and-wait transport, and fed to the
//! local peer negotiator.

pub mod negotiation;
pub mod signaler;

pub use negotiation::{accept, connect, PeerNegotiator};
pub use signaler::Signaler;
