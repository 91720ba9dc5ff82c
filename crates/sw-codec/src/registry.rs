//! The ordered encoder table. An encoder's index is its identity on the wire:
//! escape byte = `FIRST_CODEPOINT + index`.

use crate::dictionary::{DictionaryMatcher, WordEncoder, DICTIONARY};
use crate::encoder::{Encoded, Encoder};
use crate::hex::HexGroupEncoder;
use crate::integer::IntegerEncoder;
use crate::ipv4::Ipv4Encoder;
use crate::literal::LiteralEncoder;
use std::ops::Range;
use std::sync::LazyLock;
use sw_core::{Result, SwError};

/// First byte value reserved for escape tokens.
pub const FIRST_CODEPOINT: u8 = 176;

/// Process-wide registry: the built-in dictionary, hex, IPv4, the three
/// integer widths and the literal escape, in that order.
pub static REGISTRY: LazyLock<Registry> =
    LazyLock::new(|| Registry::new(DICTIONARY).expect("built-in registry is well-formed"));

pub struct Registry {
    encoders: Vec<Box<dyn Encoder>>,
    dictionary: DictionaryMatcher,
    /// Words occupy ids `0..word_count`.
    word_count: usize,
    literal_id: usize,
}

impl Registry {
    /// Build a registry with `words` as the dictionary, followed by the fixed
    /// hex/IPv4/integer encoders and the literal escape.
    pub fn new(words: &[&'static str]) -> Result<Self> {
        if words.iter().any(|w| w.is_empty()) {
            return Err(SwError::InvalidConfig("dictionary words must be non-empty".into()));
        }

        let mut encoders: Vec<Box<dyn Encoder>> = words
            .iter()
            .map(|w| Box::new(WordEncoder::new(w)) as Box<dyn Encoder>)
            .collect();
        encoders.push(Box::new(HexGroupEncoder));
        encoders.push(Box::new(Ipv4Encoder));
        encoders.push(Box::new(IntegerEncoder::u8()));
        encoders.push(Box::new(IntegerEncoder::u16()));
        encoders.push(Box::new(IntegerEncoder::u32_saturating()));

        let literal_id = encoders.len();
        let len = literal_id + 1;
        // The range end must itself be a byte value.
        if usize::from(FIRST_CODEPOINT) + len > usize::from(u8::MAX) {
            return Err(SwError::InvalidConfig(format!(
                "{len} encoders do not fit above codepoint {FIRST_CODEPOINT}"
            )));
        }
        let reserved = FIRST_CODEPOINT..FIRST_CODEPOINT + len as u8;
        encoders.push(Box::new(LiteralEncoder::new(reserved)));

        Ok(Self {
            encoders,
            dictionary: DictionaryMatcher::new(words)?,
            word_count: words.len(),
            literal_id,
        })
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&dyn Encoder> {
        self.encoders.get(id).map(|e| e.as_ref())
    }

    pub fn literal_id(&self) -> usize {
        self.literal_id
    }

    /// Bytes that always start an escape token.
    pub fn escape_range(&self) -> Range<u8> {
        FIRST_CODEPOINT..FIRST_CODEPOINT + self.len() as u8
    }

    /// `None` for an id outside the registry.
    pub fn escape_byte(&self, id: usize) -> Option<u8> {
        if id >= self.len() {
            return None;
        }
        u8::try_from(id).ok().map(|id| FIRST_CODEPOINT + id)
    }

    pub fn is_reserved(&self, byte: u8) -> bool {
        self.escape_range().contains(&byte)
    }

    pub fn id_of(&self, byte: u8) -> Option<usize> {
        self.is_reserved(byte).then(|| usize::from(byte - FIRST_CODEPOINT))
    }

    /// First encoder, in registration order, that accepts the input at `pos`.
    /// The literal escape only takes part when `escape_reserved` is set.
    pub fn match_at(&self, input: &[u8], pos: usize, out: &mut Vec<u8>, escape_reserved: bool) -> Option<(usize, Encoded)> {
        if let Some((id, len)) = self.dictionary.find_at(input, pos) {
            return Some((id, Encoded { consumed: len, produced: 0 }));
        }
        self.match_from(self.word_count, input, pos, out, escape_reserved)
    }

    /// Same precedence as [`Registry::match_at`], asking every word in turn.
    pub fn match_at_linear(&self, input: &[u8], pos: usize, out: &mut Vec<u8>, escape_reserved: bool) -> Option<(usize, Encoded)> {
        self.match_from(0, input, pos, out, escape_reserved)
    }

    fn match_from(&self, first: usize, input: &[u8], pos: usize, out: &mut Vec<u8>, escape_reserved: bool) -> Option<(usize, Encoded)> {
        self.encoders
            .iter()
            .enumerate()
            .skip(first)
            .filter(|(id, _)| escape_reserved || *id != self.literal_id)
            .find_map(|(id, encoder)| encoder.compress(input, pos, out).map(|encoded| (id, encoded)))
    }
}
