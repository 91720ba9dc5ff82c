//! Byte stuffing for input bytes that fall inside the escape range.

use crate::encoder::{payload, Decoded, Encoded, Encoder};
use std::borrow::Cow;
use std::ops::Range;
use sw_core::Result;

/// Emits `[escape, byte]` for a byte that would otherwise read as an escape.
pub struct LiteralEncoder {
    reserved: Range<u8>,
}

impl LiteralEncoder {
    pub fn new(reserved: Range<u8>) -> Self {
        Self { reserved }
    }
}

impl Encoder for LiteralEncoder {
    fn name(&self) -> &str {
        "literal"
    }

    fn compress(&self, input: &[u8], pos: usize, out: &mut Vec<u8>) -> Option<Encoded> {
        let byte = *input.get(pos)?;
        if !self.reserved.contains(&byte) {
            return None;
        }
        out.push(byte);
        Some(Encoded { consumed: 1, produced: 1 })
    }

    fn decompress(&self, buf: &[u8], pos: usize) -> Result<Decoded> {
        let byte = payload(buf, pos, 1, self.name())?[0];
        Ok(Decoded { consumed: 1, bytes: Cow::Owned(vec![byte]) })
    }
}
