//! Wire layout of transfer headers and acknowledgments.

use sw_core::{Result, SwError};

/// Copies of every header field and ack value on the wire.
pub const REDUNDANCY: usize = 3;
pub const HEADER_LEN: usize = 2 * REDUNDANCY;
pub const ACK_LEN: usize = REDUNDANCY;
/// Ack value confirming the header. Chunk `i` is confirmed by `i + 2`.
pub const HEADER_ACK: u8 = 1;
/// Highest chunk count whose final ack value still fits in a byte.
pub const MAX_CHUNKS: usize = u8::MAX as usize - 1;

/// How a payload is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferHeader {
    pub chunk_count: u8,
    /// Length of the final chunk: `chunk_size` when the payload divides
    /// evenly, never 0 unless the payload is empty.
    pub last_chunk_len: u8,
}

impl TransferHeader {
    pub fn plan(payload_len: usize, chunk_size: u8) -> Result<Self> {
        if chunk_size == 0 {
            return Err(SwError::InvalidConfig("chunk_size must be nonzero".into()));
        }
        if payload_len == 0 {
            return Ok(Self { chunk_count: 0, last_chunk_len: 0 });
        }

        let size = usize::from(chunk_size);
        let count = payload_len.div_ceil(size);
        if count > MAX_CHUNKS {
            return Err(SwError::PayloadTooLarge { len: payload_len, max: MAX_CHUNKS * size });
        }
        let last = payload_len - (count - 1) * size;
        Ok(Self { chunk_count: count as u8, last_chunk_len: last as u8 })
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let (c, l) = (self.chunk_count, self.last_chunk_len);
        [c, c, c, l, l, l]
    }

    /// Majority-vote each field and check it against `chunk_size`.
    pub fn decode(bytes: &[u8], chunk_size: u8) -> Result<Self> {
        if bytes.len() != HEADER_LEN {
            return Err(SwError::MalformedPayload(format!(
                "header is {} bytes, expected {HEADER_LEN}",
                bytes.len()
            )));
        }
        let (count, last) = bytes.split_at(REDUNDANCY);
        let chunk_count = majority(count)
            .ok_or_else(|| SwError::MalformedPayload(format!("no majority in chunk count {count:?}")))?;
        let last_chunk_len = majority(last)
            .ok_or_else(|| SwError::MalformedPayload(format!("no majority in last chunk length {last:?}")))?;

        let consistent = if chunk_count == 0 {
            last_chunk_len == 0
        } else {
            usize::from(chunk_count) <= MAX_CHUNKS && last_chunk_len > 0 && last_chunk_len <= chunk_size
        };
        if !consistent {
            return Err(SwError::MalformedPayload(format!(
                "inconsistent header: {chunk_count} chunks, last {last_chunk_len} bytes, chunk size {chunk_size}"
            )));
        }
        Ok(Self { chunk_count, last_chunk_len })
    }

    pub fn chunk_count(&self) -> usize {
        usize::from(self.chunk_count)
    }

    pub fn payload_len(&self, chunk_size: u8) -> usize {
        match self.chunk_count() {
            0 => 0,
            n => (n - 1) * usize::from(chunk_size) + usize::from(self.last_chunk_len),
        }
    }

    pub fn chunk_len(&self, index: usize, chunk_size: u8) -> usize {
        if index + 1 == self.chunk_count() {
            usize::from(self.last_chunk_len)
        } else {
            usize::from(chunk_size)
        }
    }

    pub fn chunk<'p>(&self, payload: &'p [u8], index: usize, chunk_size: u8) -> &'p [u8] {
        let start = index * usize::from(chunk_size);
        &payload[start..start + self.chunk_len(index, chunk_size)]
    }
}

/// Ack value confirming chunk `index`.
pub fn chunk_ack(index: usize) -> u8 {
    debug_assert!(index < MAX_CHUNKS);
    index as u8 + 2
}

/// Ack value asking for chunk `index` again.
pub fn chunk_nack(index: usize) -> u8 {
    debug_assert!(index < MAX_CHUNKS);
    index as u8 + 1
}

pub fn encode_ack(value: u8) -> [u8; ACK_LEN] {
    [value; ACK_LEN]
}

/// Decode the most recent ack in `bytes`; earlier ones may have queued up.
pub fn decode_ack(bytes: &[u8]) -> Option<u8> {
    let start = bytes.len().checked_sub(ACK_LEN)?;
    majority(&bytes[start..])
}

fn majority(copies: &[u8]) -> Option<u8> {
    copies
        .iter()
        .copied()
        .find(|candidate| copies.iter().filter(|c| *c == candidate).count() * 2 > copies.len())
}
