//! Domain-tuned reversible compressor for JSON-encoded handshake payloads.
//!
//! Encoders, in priority order (first match wins):
//! 1. Dictionary words — fixed session-description and candidate fragments
//! 2. Hex groups — `AA:BB:CC` fingerprints
//! 3. IPv4 — dotted-decimal addresses
//! 4. Integers — 1, 2 and 4 byte widths, the last one saturating
//! 5. Literal escape — input bytes that collide with the escape range
//!
//! Each encoder owns one byte starting at [`FIRST_CODEPOINT`]; any other byte
//! in the stream is literal text.

pub mod codec;
pub mod dictionary;
pub mod encoder;
pub mod hex;
pub mod integer;
pub mod ipv4;
pub mod literal;
pub mod registry;

pub use codec::{compress, decompress, Codec, CompressionResult};
pub use encoder::{Decoded, Encoded, Encoder};
pub use registry::{Registry, FIRST_CODEPOINT, REGISTRY};

#[cfg(test)]
mod tests;
