use crate::*;
use crate::dictionary::{DictionaryMatcher, WordEncoder, DICTIONARY};
use crate::hex::HexGroupEncoder;
use crate::integer::IntegerEncoder;
use crate::ipv4::Ipv4Encoder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sw_core::{CodecConfig, SwError};

const HEX: u8 = 223;
const IPV4: u8 = 224;
const UINT8: u8 = 225;
const UINT16: u8 = 226;
const UINT32: u8 = 227;
const LITERAL: u8 = 228;

const OFFER_JSON: &str = r#"[{"type":"offer","sdp":"v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\na=group:BUNDLE 0\r\na=msid-semantic: WMS\r\nm=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\nc=IN IP4 0.0.0.0\r\na=ice-ufrag:JRmH\r\na=ice-pwd:kVq3MlQbKz9fjp5K2yN8QF1j\r\na=ice-options:trickle\r\na=fingerprint:sha-256 2A:3B:4C:5D:6E:7F:80:91:A2:B3:C4:D5:E6:F7:08:19:2A:3B:4C:5D:6E:7F:80:91:A2:B3:C4:D5:E6:F7:08:19\r\na=setup:actpass\r\na=mid:0\r\na=sctp-port:5000\r\na=max-message-size:262144\r\n"},[{"candidate":"candidate:842163049 1 udp 1677729535 203.0.113.5 49203 typ srflx raddr 0.0.0.0 rport 0 generation 0 ufrag JRmH network-cost 999","sdpMid":"0","sdpMLineIndex":0},{"candidate":"candidate:1467250027 1 tcp 1518280447 192.168.1.7 9 typ host tcptype active generation 0 ufrag JRmH network-id 1 network-cost 10","sdpMid":"0","sdpMLineIndex":0}]]"#;

fn roundtrip(text: &str) -> String {
    decompress(&compress(text)).unwrap()
}

// ========== Registry ==========

#[test]
fn test_registry_layout() {
    assert_eq!(DICTIONARY.len(), 47);
    assert_eq!(REGISTRY.len(), 53);
    assert_eq!(REGISTRY.escape_range(), 176..229);
    assert_eq!(REGISTRY.get(47).unwrap().name(), "hex");
    assert_eq!(REGISTRY.get(48).unwrap().name(), "ipv4");
    assert_eq!(REGISTRY.get(49).unwrap().name(), "uint8");
    assert_eq!(REGISTRY.get(50).unwrap().name(), "uint16");
    assert_eq!(REGISTRY.get(51).unwrap().name(), "uint32");
    assert_eq!(REGISTRY.get(52).unwrap().name(), "literal");
    assert_eq!(REGISTRY.literal_id(), 52);
}

#[test]
fn test_registry_escape_bytes() {
    assert_eq!(REGISTRY.escape_byte(0), Some(176));
    assert_eq!(REGISTRY.escape_byte(52), Some(228));
    assert_eq!(REGISTRY.escape_byte(53), None);
    assert_eq!(REGISTRY.escape_byte(usize::MAX), None);
    assert_eq!(REGISTRY.id_of(176), Some(0));
    assert_eq!(REGISTRY.id_of(228), Some(52));
    assert_eq!(REGISTRY.id_of(229), None);
    assert_eq!(REGISTRY.id_of(b'a'), None);
}

#[test]
fn test_registry_word_names() {
    assert_eq!(REGISTRY.get(0).unwrap().name(), "dict-{\"t");
    assert_eq!(WordEncoder::new("BUNDLE").name(), "dict-BUN");
}

#[test]
fn test_registry_rejects_empty_word() {
    assert!(matches!(Registry::new(&["ab", ""]), Err(SwError::InvalidConfig(_))));
}

#[test]
fn test_registry_rejects_overflowing_range() {
    let words: Vec<&'static str> = (0..80).map(|i| &*Box::leak(format!("w{i}").into_boxed_str())).collect();
    assert!(matches!(Registry::new(&words), Err(SwError::InvalidConfig(_))));
}

#[test]
fn test_dictionary_matcher_prefers_listed_first() {
    let m = DictionaryMatcher::new(&["ab", "abc"]).unwrap();
    assert_eq!(m.find_at(b"abc", 0), Some((0, 2)));
    let m = DictionaryMatcher::new(&["abc", "ab"]).unwrap();
    assert_eq!(m.find_at(b"abc", 0), Some((0, 3)));
    assert_eq!(m.find_at(b"abd", 0), Some((1, 2)));
    assert_eq!(m.find_at(b"xabc", 0), None);
    assert_eq!(m.find_at(b"xabc", 1), Some((0, 3)));
}

#[test]
fn test_dictionary_matcher_empty() {
    let m = DictionaryMatcher::new(&[]).unwrap();
    assert_eq!(m.find_at(b"anything", 0), None);
}

#[test]
fn test_dictionary_matcher_escapes_metacharacters() {
    let m = DictionaryMatcher::new(DICTIONARY).unwrap();
    assert_eq!(m.find_at(br"\r\na=setup:actpass", 0), Some((14, 12)));
    assert_eq!(m.find_at(b"rna=setup:", 0), None);
}

#[test]
fn test_automaton_agrees_with_linear_scan() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let text = random_text(&mut rng, 12);
        let input = text.as_bytes();
        for pos in 0..input.len() {
            let mut fast = Vec::new();
            let mut slow = Vec::new();
            let a = REGISTRY.match_at(input, pos, &mut fast, true);
            let b = REGISTRY.match_at_linear(input, pos, &mut slow, true);
            assert_eq!(a, b, "mismatch at {pos} in {text:?}");
            assert_eq!(fast, slow);
        }
    }
}

// ========== Word encoder ==========

#[test]
fn test_word_single_byte() {
    assert_eq!(compress(r#""sdpMLineIndex":0}"#), vec![187]);
}

#[test]
fn test_word_earlier_entry_wins() {
    // Both `"sdpMLineIndex":0}` and `"sdpMLineIndex":` match; the first listed wins.
    assert_eq!(compress(r#""sdpMLineIndex":0}"#)[0], 187);
    assert_eq!(compress(r#""sdpMLineIndex":1}"#), vec![188, b'1', b'}']);
}

#[test]
fn test_word_beats_integer() {
    // " 1" is a word; the digits after it go to the integer encoder.
    assert_eq!(compress(" 1234"), vec![220, UINT8, 234]);
    assert_eq!(roundtrip(" 1234"), " 1234");
}

#[test]
fn test_custom_registry_priority() {
    let registry = Registry::new(&["ab", "abc"]).unwrap();
    let codec = Codec::with_registry(&registry, CodecConfig::default());
    assert_eq!(codec.compress("abc"), vec![176, b'c']);
    assert_eq!(codec.decompress(&[176, b'c']).unwrap(), "abc");

    let registry = Registry::new(&["abc", "ab"]).unwrap();
    let codec = Codec::with_registry(&registry, CodecConfig::default());
    assert_eq!(codec.compress("abc"), vec![176]);
    assert_eq!(codec.compress("abd"), vec![177, b'd']);
}

#[test]
fn test_word_escaped_crlf() {
    let out = compress(r"\r\n");
    assert_eq!(out, vec![176 + 36]);
    assert_eq!(roundtrip(r"\r\n"), r"\r\n");
}

// ========== Hex encoder ==========

#[test]
fn test_hex_groups() {
    assert_eq!(compress("AA:BB:CC"), vec![HEX, 3, 0xAA, 0xBB, 0xCC]);
    assert_eq!(decompress(&[HEX, 3, 0xAA, 0xBB, 0xCC]).unwrap(), "AA:BB:CC");
}

#[test]
fn test_hex_lowercase_not_matched() {
    assert_eq!(compress("aa:bb:cc"), b"aa:bb:cc".to_vec());
}

#[test]
fn test_hex_beats_integer() {
    assert_eq!(compress("12:34:56"), vec![HEX, 3, 0x12, 0x34, 0x56]);
}

#[test]
fn test_hex_minimum_two_groups() {
    let mut out = Vec::new();
    assert_eq!(HexGroupEncoder.compress(b"AA:", 0, &mut out), None);
    assert_eq!(HexGroupEncoder.compress(b"AA:B", 0, &mut out), None);
    assert_eq!(HexGroupEncoder.compress(b"AA", 0, &mut out), None);
    assert!(out.is_empty());
    assert_eq!(HexGroupEncoder.compress(b"AA:BB", 0, &mut out), Some(Encoded { consumed: 5, produced: 3 }));
    assert_eq!(out, vec![2, 0xAA, 0xBB]);
}

#[test]
fn test_hex_stops_at_noncanonical_group() {
    let mut out = Vec::new();
    let encoded = HexGroupEncoder.compress(b"AA:BB:cc", 0, &mut out).unwrap();
    assert_eq!(encoded.consumed, 5);
    assert_eq!(roundtrip("AA:BB:cc"), "AA:BB:cc");
    assert_eq!(roundtrip("AA:BBC"), "AA:BBC");
    assert_eq!(roundtrip("AA:BB:"), "AA:BB:");
}

#[test]
fn test_hex_rejects_signs_and_padding() {
    let mut out = Vec::new();
    assert_eq!(HexGroupEncoder.compress(b"-1:AA:BB", 0, &mut out), None);
    assert_eq!(HexGroupEncoder.compress(b"A:BB:CC", 0, &mut out), None);
}

#[test]
fn test_hex_group_count_capped() {
    let text = vec!["AB"; 300].join(":");
    let mut out = Vec::new();
    let encoded = HexGroupEncoder.compress(text.as_bytes(), 0, &mut out).unwrap();
    assert_eq!(out[0], 255);
    assert_eq!(encoded.consumed, 255 * 3 - 1);
    assert_eq!(roundtrip(&text), text);
}

#[test]
fn test_hex_fingerprint() {
    let fp = "2A:3B:4C:5D:6E:7F:80:91:A2:B3:C4:D5:E6:F7:08:19:2A:3B:4C:5D:6E:7F:80:91:A2:B3:C4:D5:E6:F7:08:19";
    let out = compress(fp);
    assert_eq!(out.len(), 2 + 32);
    assert_eq!(roundtrip(fp), fp);
}

// ========== IPv4 encoder ==========

#[test]
fn test_ipv4_basic() {
    assert_eq!(compress("192.168.1.1"), vec![IPV4, 192, 168, 1, 1]);
    assert_eq!(roundtrip("192.168.1.1"), "192.168.1.1");
}

#[test]
fn test_ipv4_leading_zero_rejected() {
    let out = compress("192.168.01.1");
    assert_eq!(out, vec![UINT8, 192, b'.', UINT8, 168, b'.', b'0', b'1', b'.', b'1']);
    assert_eq!(roundtrip("192.168.01.1"), "192.168.01.1");
}

#[test]
fn test_ipv4_zero_octets() {
    assert_eq!(compress("0.0.0.0"), vec![IPV4, 0, 0, 0, 0]);
}

#[test]
fn test_ipv4_octet_out_of_range() {
    let mut out = Vec::new();
    assert_eq!(Ipv4Encoder.compress(b"256.1.1.1", 0, &mut out), None);
    assert_eq!(Ipv4Encoder.compress(b"1.1.1.1000", 0, &mut out), None);
    assert_eq!(Ipv4Encoder.compress(b"1.1.1", 0, &mut out), None);
    assert_eq!(Ipv4Encoder.compress(b"1.1.1.", 0, &mut out), None);
    assert_eq!(Ipv4Encoder.compress(b"1..1.1", 0, &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn test_ipv4_stops_after_fourth_octet() {
    let mut out = Vec::new();
    let encoded = Ipv4Encoder.compress(b"10.0.0.1.5", 0, &mut out).unwrap();
    assert_eq!(encoded.consumed, 8);
    assert_eq!(roundtrip("10.0.0.1.5"), "10.0.0.1.5");
}

// ========== Integer encoders ==========

#[test]
fn test_int_single_digit_never_compresses() {
    assert_eq!(compress("9"), b"9".to_vec());
}

#[test]
fn test_int_two_digits_u8() {
    assert_eq!(compress("99"), vec![UINT8, 99]);
    assert_eq!(compress("255"), vec![UINT8, 255]);
}

#[test]
fn test_int_width_boundaries() {
    let mut out = Vec::new();
    assert_eq!(IntegerEncoder::u8().compress(b"9", 0, &mut out), None);
    assert!(IntegerEncoder::u8().compress(b"99", 0, &mut out).is_some());
    assert_eq!(IntegerEncoder::u16().compress(b"99", 0, &mut out), None);
    assert!(IntegerEncoder::u16().compress(b"999", 0, &mut out).is_some());
    assert_eq!(IntegerEncoder::u32_saturating().compress(b"9999", 0, &mut out), None);
    assert!(IntegerEncoder::u32_saturating().compress(b"99999", 0, &mut out).is_some());
}

#[test]
fn test_int_overflow_falls_through_widths() {
    assert_eq!(compress("256"), vec![UINT16, 0x00, 0x01]);
    assert_eq!(compress("1234"), vec![UINT16, 0xD2, 0x04]);
    assert_eq!(compress("65535"), vec![UINT16, 0xFF, 0xFF]);
    assert_eq!(compress("65536"), vec![UINT32, 0x00, 0x00, 0x01, 0x00]);
}

#[test]
fn test_int_non_saturating_declines() {
    let mut out = Vec::new();
    assert_eq!(IntegerEncoder::u8().compress(b"300", 0, &mut out), None);
    assert_eq!(IntegerEncoder::u16().compress(b"70000", 0, &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn test_int_leading_zero() {
    assert_eq!(compress("0123"), vec![b'0', UINT8, 123]);
    assert_eq!(roundtrip("0123"), "0123");
}

#[test]
fn test_int_saturation_at_max() {
    assert_eq!(compress("42949672961"), vec![UINT32, 0xFF, 0xFF, 0xFF, 0xFF, b'1']);
    assert_eq!(roundtrip("42949672961"), "42949672961");
}

#[test]
fn test_int_saturation_shortens_by_one() {
    // 9999999999 does not fit, 999999999 does.
    assert_eq!(compress("99999999999"), vec![UINT32, 0xFF, 0xC9, 0x9A, 0x3B, UINT8, 99]);
    assert_eq!(roundtrip("99999999999"), "99999999999");
}

#[test]
fn test_int_very_long_run() {
    let digits = "1".repeat(40);
    assert_eq!(roundtrip(&digits), digits);
}

#[test]
fn test_int_little_endian_payload() {
    let mut out = Vec::new();
    IntegerEncoder::u32_saturating().compress(b"305419896", 0, &mut out).unwrap();
    assert_eq!(out, vec![0x78, 0x56, 0x34, 0x12]);
}

// ========== Reserved codepoints ==========

#[test]
fn test_reserved_byte_is_stuffed() {
    // U+00E9 is C3 A9 in UTF-8; C3 lies in the escape range.
    let result = Codec::default().compress_with_stats("é");
    assert_eq!(result.output, vec![LITERAL, 0xC3, 0xA9]);
    assert_eq!(result.escaped_literals, 1);
    assert_eq!(result.collisions, 0);
    assert!(result.is_lossless());
    assert_eq!(decompress(&result.output).unwrap(), "é");
}

#[test]
fn test_reserved_byte_raw_when_escaping_disabled() {
    let codec = Codec::new(CodecConfig { escape_reserved: false });
    let result = codec.compress_with_stats("é");
    assert_eq!(result.output, vec![0xC3, 0xA9]);
    assert_eq!(result.collisions, 1);
    assert!(!result.is_lossless());
    assert_ne!(codec.decompress(&result.output).ok().as_deref(), Some("é"));
}

#[test]
fn test_non_ascii_roundtrip() {
    for text in ["°C", "naïve café", "日本語", "emoji 🎉 in sdp", "\u{b0}\u{e4}"] {
        assert_eq!(roundtrip(text), text);
    }
}

// ========== Decompressor ==========

#[test]
fn test_decompress_plain_bytes() {
    assert_eq!(decompress(b"hello").unwrap(), "hello");
}

#[test]
fn test_decompress_empty() {
    assert_eq!(decompress(&[]).unwrap(), "");
    assert!(compress("").is_empty());
}

#[test]
fn test_decompress_from_offset() {
    let mut buf = b"xx".to_vec();
    buf.extend(compress("typ host 10.0.0.1"));
    assert_eq!(Codec::default().decompress_from(&buf, 2).unwrap(), "typ host 10.0.0.1");
}

#[test]
fn test_decompress_offset_past_end() {
    let err = Codec::default().decompress_from(b"ab", 3).unwrap_err();
    assert!(matches!(err, SwError::MalformedPayload(_)));
}

#[test]
fn test_decompress_truncated_tokens() {
    for buf in [vec![UINT32, 1, 2], vec![IPV4, 10], vec![HEX], vec![HEX, 3, 0xAA], vec![LITERAL]] {
        let err = decompress(&buf).unwrap_err();
        assert!(matches!(err, SwError::MalformedPayload(_)), "{buf:?}");
    }
}

#[test]
fn test_decompress_empty_hex_token() {
    assert!(matches!(decompress(&[HEX, 0]), Err(SwError::MalformedPayload(_))));
}

#[test]
fn test_decompress_invalid_utf8() {
    assert!(matches!(decompress(&[0xFF]), Err(SwError::MalformedPayload(_))));
}

// ========== Whole payloads ==========

#[test]
fn test_offer_roundtrip() {
    assert_eq!(roundtrip(OFFER_JSON), OFFER_JSON);
}

#[test]
fn test_offer_shrinks() {
    let result = Codec::default().compress_with_stats(OFFER_JSON);
    assert_eq!(result.original_len, OFFER_JSON.len());
    assert!(result.ratio() < 0.75, "ratio {}", result.ratio());
    assert!(result.reduction_pct > 25.0);
    assert!(result.tokens > 40);
}

#[test]
fn test_ratio_of_empty_input() {
    let result = Codec::default().compress_with_stats("");
    assert_eq!(result.ratio(), 1.0);
    assert_eq!(result.reduction_pct, 0.0);
}

const FRAGMENTS: &[&str] = &[
    "0", "1", "9", "25", "255", "256", "65535", "65536", "4294967295", "4294967296", "007",
    ".", ":", "AA", "0F", "ff", "G1", "-", " ", "192.168.0.1", "1.2.3", "é", "\u{b0}", "日",
    r"\r\n", "a=mid:", "typ host", r#""sdpMid":"0","#, "},{", "x", "{", "\"",
];

fn random_text(rng: &mut StdRng, max_fragments: usize) -> String {
    let count = rng.gen_range(0..=max_fragments);
    (0..count).map(|_| FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())]).collect()
}

#[test]
fn test_random_roundtrip() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1_000 {
        let text = random_text(&mut rng, 24);
        assert_eq!(roundtrip(&text), text);
    }
}

#[test]
fn test_ascii_never_grows() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let text: String = random_text(&mut rng, 24).chars().filter(|c| c.is_ascii()).collect();
        assert!(compress(&text).len() <= text.len(), "{text:?}");
    }
}
