//! The encoder contract shared by every token family.

use std::borrow::Cow;
use sw_core::{Result, SwError};

/// A successful match: how much input text was eaten and how many payload
/// bytes were appended after the escape byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub consumed: usize,
    pub produced: usize,
}

/// A decoded token: how many payload bytes were read and the text they stand for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub consumed: usize,
    pub bytes: Cow<'static, [u8]>,
}

pub trait Encoder: Send + Sync {
    fn name(&self) -> &str;

    /// Try to encode the text starting at `input[pos]`.
    ///
    /// On a match the payload is appended to `out`; on `None` nothing is written.
    /// Declining is never an error: the compressor falls back to the literal byte.
    fn compress(&self, input: &[u8], pos: usize, out: &mut Vec<u8>) -> Option<Encoded>;

    /// Decode the payload starting at `buf[pos]` (the byte after the escape).
    fn decompress(&self, buf: &[u8], pos: usize) -> Result<Decoded>;
}

/// Borrow `len` payload bytes at `pos`, failing on a truncated token.
pub(crate) fn payload<'a>(buf: &'a [u8], pos: usize, len: usize, name: &str) -> Result<&'a [u8]> {
    buf.get(pos..pos + len).ok_or_else(|| {
        SwError::MalformedPayload(format!(
            "truncated {name} token at offset {pos}: need {len} bytes, {} left",
            buf.len().saturating_sub(pos)
        ))
    })
}

/// Length of the run of ASCII digits starting at `pos`.
pub(crate) fn digit_run(input: &[u8], pos: usize) -> usize {
    input.get(pos..).map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

/// Parse ASCII digits, `None` on overflow.
pub(crate) fn parse_digits(digits: &[u8]) -> Option<u64> {
    digits.iter().try_fold(0u64, |acc, &d| acc.checked_mul(10)?.checked_add(u64::from(d - b'0')))
}
