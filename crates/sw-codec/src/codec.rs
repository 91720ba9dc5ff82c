//! Compressor and decompressor over the encoder registry.

use crate::registry::{Registry, REGISTRY};
use sw_core::{CodecConfig, Result, SwError};
use tracing::{debug, warn};

/// Compression output with statistics.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub output: Vec<u8>,
    pub original_len: usize,
    pub compressed_len: usize,
    pub reduction_pct: f64,
    /// Escape tokens emitted, stuffed literals included.
    pub tokens: usize,
    /// Input bytes inside the escape range that went out behind the literal escape.
    pub escaped_literals: usize,
    /// Input bytes inside the escape range that went out raw and will not decode back.
    pub collisions: usize,
}

impl CompressionResult {
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 { return 1.0; }
        self.compressed_len as f64 / self.original_len as f64
    }

    /// Whether decompressing `output` reproduces the input exactly.
    pub fn is_lossless(&self) -> bool {
        self.collisions == 0
    }
}

pub struct Codec<'r> {
    registry: &'r Registry,
    config: CodecConfig,
}

impl Codec<'static> {
    pub fn new(config: CodecConfig) -> Self {
        Self { registry: &REGISTRY, config }
    }
}

impl Default for Codec<'static> {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl<'r> Codec<'r> {
    pub fn with_registry(registry: &'r Registry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn compress(&self, text: &str) -> Vec<u8> {
        self.compress_with_stats(text).output
    }

    /// Greedy left-to-right scan: at each position the first encoder that
    /// accepts the input emits its escape byte and payload, otherwise the raw
    /// byte goes out.
    pub fn compress_with_stats(&self, text: &str) -> CompressionResult {
        let input = text.as_bytes();
        let mut out = Vec::with_capacity(input.len());
        let mut tokens = 0;
        let mut escaped_literals = 0;
        let mut collisions = 0;

        let mut pos = 0;
        while pos < input.len() {
            let byte = input[pos];
            let reserved = self.registry.is_reserved(byte);
            if reserved && !self.config.escape_reserved {
                collisions += 1;
                warn!(offset = pos, byte, "reserved codepoint in input, it will be decoded as an escape");
            }

            // Slot for the escape byte; encoders write their payload after it.
            let mark = out.len();
            out.push(0);
            let matched = self
                .registry
                .match_at(input, pos, &mut out, self.config.escape_reserved)
                .and_then(|(id, encoded)| Some((id, self.registry.escape_byte(id)?, encoded)));
            match matched {
                Some((id, escape, encoded)) => {
                    out[mark] = escape;
                    pos += encoded.consumed;
                    tokens += 1;
                    if id == self.registry.literal_id() {
                        escaped_literals += 1;
                    }
                }
                None => {
                    out.truncate(mark);
                    out.push(byte);
                    pos += 1;
                }
            }
        }

        let original_len = input.len();
        let compressed_len = out.len();
        let reduction_pct = if original_len > 0 {
            (original_len as f64 - compressed_len as f64) / original_len as f64 * 100.0
        } else {
            0.0
        };
        debug!(original_len, compressed_len, tokens, "compressed {:.1}%", reduction_pct);

        CompressionResult {
            output: out,
            original_len,
            compressed_len,
            reduction_pct,
            tokens,
            escaped_literals,
            collisions,
        }
    }

    pub fn decompress(&self, buf: &[u8]) -> Result<String> {
        self.decompress_from(buf, 0)
    }

    /// Replay tokens from `offset` to the end of `buf`.
    pub fn decompress_from(&self, buf: &[u8], offset: usize) -> Result<String> {
        if offset > buf.len() {
            return Err(SwError::MalformedPayload(format!(
                "offset {offset} past end of {}-byte buffer",
                buf.len()
            )));
        }

        let mut out = Vec::with_capacity(buf.len() * 2);
        let mut pos = offset;
        while pos < buf.len() {
            let byte = buf[pos];
            match self.registry.id_of(byte).and_then(|id| self.registry.get(id)) {
                Some(encoder) => {
                    let decoded = encoder.decompress(buf, pos + 1)?;
                    out.extend_from_slice(&decoded.bytes);
                    pos += 1 + decoded.consumed;
                }
                None => {
                    out.push(byte);
                    pos += 1;
                }
            }
        }

        String::from_utf8(out)
            .map_err(|e| SwError::MalformedPayload(format!("decompressed text is not UTF-8: {e}")))
    }
}

/// Compress with the built-in registry and default settings.
pub fn compress(text: &str) -> Vec<u8> {
    Codec::default().compress(text)
}

/// Decompress a buffer produced by [`compress`].
pub fn decompress(buf: &[u8]) -> Result<String> {
    Codec::default().decompress(buf)
}
