//! Dictionary words: fixed fragments of JSON-encoded session descriptions
//! and candidates, each standing for itself behind a single escape byte.

use crate::encoder::{Decoded, Encoded, Encoder};
use regex::bytes::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use sw_core::{Result, SwError};

/// Built-in dictionary in priority order. Entries are matched against the
/// JSON text, so `\r\n` here is the escaped four-character form.
pub const DICTIONARY: &[&str] = &[
    r#"{"type":"offer","sdp":"v="#,
    r"\r\na=max-message-size:",
    r#",{"candidate":"candidate:"#,
    r#"{"candidate":"candidate:"#,
    r"\r\na=msid-semantic:",
    r"\r\na=ice-options:",
    r"\r\na=fingerprint:",
    r"\r\na=ice-ufrag:",
    r"\r\na=sctp-port:",
    "webrtc-datachannel",
    r"\r\na=ice-pwd:",
    r#""sdpMLineIndex":0}"#,
    r#""sdpMLineIndex":"#,
    " network-cost ",
    r"\r\na=setup:",
    r"\r\na=group:",
    "m=application",
    "UDP/DTLS/SCTP",
    r#""sdpMid":"0","#,
    " network-id ",
    " generation",
    r#""sdpMid":"#,
    r"\r\no=",
    r"\r\nt=",
    r"\r\ns=",
    r"\r\nc=",
    "typ host",
    " tcptype",
    "IN IP4 ",
    "actpass",
    "trickle",
    "sha-256",
    " active",
    "BUNDLE",
    "a=mid:",
    " ufrag",
    r"\r\n",
    "type",
    "JRmH",
    " udp",
    " tcp",
    "WMS",
    "},{",
    r#""0","#,
    " 1",
    " 9",
    r#"","#,
];

/// A single dictionary entry. Carries no payload: the id alone names the word.
pub struct WordEncoder {
    word: &'static str,
    name: String,
}

impl WordEncoder {
    pub fn new(word: &'static str) -> Self {
        let prefix: String = word.chars().take(3).collect();
        Self { word, name: format!("dict-{prefix}") }
    }

    pub fn word(&self) -> &'static str {
        self.word
    }
}

impl Encoder for WordEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn compress(&self, input: &[u8], pos: usize, _out: &mut Vec<u8>) -> Option<Encoded> {
        let rest = input.get(pos..)?;
        rest.starts_with(self.word.as_bytes())
            .then_some(Encoded { consumed: self.word.len(), produced: 0 })
    }

    fn decompress(&self, _buf: &[u8], _pos: usize) -> Result<Decoded> {
        Ok(Decoded { consumed: 0, bytes: Cow::Borrowed(self.word.as_bytes()) })
    }
}

/// Finds the earliest-listed word that prefixes the input at a position, in
/// one anchored pass instead of one `starts_with` per word.
///
/// The alternation is leftmost-first, so among words matching at the same
/// offset the one listed first wins, exactly like scanning the list in order.
pub struct DictionaryMatcher {
    pattern: Regex,
    ids: HashMap<&'static [u8], usize>,
}

impl DictionaryMatcher {
    pub fn new(words: &[&'static str]) -> Result<Self> {
        let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
        let pattern = Regex::new(&format!(r"(?-u)\A(?:{alternation})"))
            .map_err(|e| SwError::InvalidConfig(format!("dictionary does not compile: {e}")))?;

        let mut ids = HashMap::with_capacity(words.len());
        for (id, word) in words.iter().enumerate() {
            ids.entry(word.as_bytes()).or_insert(id);
        }
        Ok(Self { pattern, ids })
    }

    /// Id (index into the word list) and length of the matching word.
    pub fn find_at(&self, input: &[u8], pos: usize) -> Option<(usize, usize)> {
        if self.ids.is_empty() {
            return None;
        }
        let m = self.pattern.find(input.get(pos..)?)?;
        if m.is_empty() {
            return None;
        }
        self.ids.get(m.as_bytes()).map(|&id| (id, m.len()))
    }
}
