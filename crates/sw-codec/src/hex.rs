//! Colon-joined uppercase hex groups, as found in DTLS fingerprints.

use crate::encoder::{payload, Decoded, Encoded, Encoder};
use std::borrow::Cow;
use sw_core::{Result, SwError};

/// The group count travels in one byte.
pub const MAX_GROUPS: usize = u8::MAX as usize;

/// Shortest text worth a token: two groups (`AA:BB`) is the first length past this.
const MIN_CONSUMED: usize = 3;

pub struct HexGroupEncoder;

fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Only the canonical form round-trips: two digits, uppercase, zero-padded.
fn parse_group(pair: &[u8]) -> Option<u8> {
    Some(hex_nibble(pair[0])? << 4 | hex_nibble(pair[1])?)
}

impl Encoder for HexGroupEncoder {
    fn name(&self) -> &str {
        "hex"
    }

    fn compress(&self, input: &[u8], pos: usize, out: &mut Vec<u8>) -> Option<Encoded> {
        if input.len() < pos + 4 || input[pos + 2] != b':' {
            return None;
        }

        let mut groups = Vec::new();
        let mut consumed = 0;
        while groups.len() < MAX_GROUPS {
            let start = if groups.is_empty() {
                pos
            } else {
                if input.get(pos + consumed) != Some(&b':') {
                    break;
                }
                pos + consumed + 1
            };
            let Some(value) = input.get(start..start + 2).and_then(parse_group) else {
                break;
            };
            groups.push(value);
            consumed = start + 2 - pos;
        }

        if consumed < MIN_CONSUMED {
            return None;
        }
        out.push(groups.len() as u8);
        out.extend_from_slice(&groups);
        Some(Encoded { consumed, produced: groups.len() + 1 })
    }

    fn decompress(&self, buf: &[u8], pos: usize) -> Result<Decoded> {
        let count = usize::from(payload(buf, pos, 1, self.name())?[0]);
        if count == 0 {
            return Err(SwError::MalformedPayload(format!("empty hex token at offset {pos}")));
        }
        let groups = payload(buf, pos + 1, count, self.name())?;
        let text = groups.iter().map(|g| format!("{g:02X}")).collect::<Vec<_>>().join(":");
        Ok(Decoded { consumed: count + 1, bytes: Cow::Owned(text.into_bytes()) })
    }
}
