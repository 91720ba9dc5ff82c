//! Fixed-width unsigned integers, stored little-endian.

use crate::encoder::{digit_run, parse_digits, payload, Decoded, Encoded, Encoder};
use std::borrow::Cow;
use sw_core::Result;
use tracing::trace;

pub struct IntegerEncoder {
    width: usize,
    saturate: bool,
    name: &'static str,
}

impl IntegerEncoder {
    pub const fn u8() -> Self {
        Self { width: 1, saturate: false, name: "uint8" }
    }

    pub const fn u16() -> Self {
        Self { width: 2, saturate: false, name: "uint16" }
    }

    /// The widest encoder clamps oversized runs to their longest fitting prefix.
    pub const fn u32_saturating() -> Self {
        Self { width: 4, saturate: true, name: "uint32" }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn max_value(&self) -> u64 {
        (1u64 << (8 * self.width)) - 1
    }

    fn max_digits(&self) -> usize {
        self.max_value().to_string().len()
    }

    /// Longest prefix of `digits` whose value fits: try the length of the
    /// maximum first, then one digit shorter.
    fn saturate(&self, digits: &[u8]) -> Option<(usize, u64)> {
        let max = self.max_value();
        let mut end = digits.len().min(self.max_digits());
        let mut value = parse_digits(&digits[..end])?;
        if value > max {
            end -= 1;
            value = parse_digits(&digits[..end])?;
        }
        Some((end, value))
    }
}

impl Encoder for IntegerEncoder {
    fn name(&self) -> &str {
        self.name
    }

    fn compress(&self, input: &[u8], pos: usize, out: &mut Vec<u8>) -> Option<Encoded> {
        // Leading zeros would not survive the round trip.
        if input.get(pos) == Some(&b'0') {
            return None;
        }
        let run = digit_run(input, pos);
        // Only worth it when escape + payload is strictly shorter than the digits.
        if run < 1 + self.width {
            return None;
        }

        let digits = &input[pos..pos + run];
        let (consumed, value) = match parse_digits(digits) {
            Some(value) if value <= self.max_value() => (run, value),
            _ if self.saturate => {
                let (end, value) = self.saturate(digits)?;
                trace!(run, kept = end, "{} saturated digit run", self.name);
                (end, value)
            }
            _ => return None,
        };

        out.extend_from_slice(&value.to_le_bytes()[..self.width]);
        Some(Encoded { consumed, produced: self.width })
    }

    fn decompress(&self, buf: &[u8], pos: usize) -> Result<Decoded> {
        let bytes = payload(buf, pos, self.width, self.name)?;
        let mut raw = [0u8; 8];
        raw[..self.width].copy_from_slice(bytes);
        let text = u64::from_le_bytes(raw).to_string();
        Ok(Decoded { consumed: self.width, bytes: Cow::Owned(text.into_bytes()) })
    }
}
