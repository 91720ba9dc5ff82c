//! Shared building blocks for the serverless handshake link: error type,
//! configuration, and the handshake payload data model.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ArqConfig, CodecConfig, SignalConfig};
pub use error::{Result, SwError};
pub use types::{HandshakePayload, IceCandidate, SdpType, SessionDescription};
