//! Dotted-decimal IPv4 addresses.

use crate::encoder::{digit_run, parse_digits, payload, Decoded, Encoded, Encoder};
use std::borrow::Cow;
use sw_core::Result;

pub struct Ipv4Encoder;

impl Encoder for Ipv4Encoder {
    fn name(&self) -> &str {
        "ipv4"
    }

    fn compress(&self, input: &[u8], pos: usize, out: &mut Vec<u8>) -> Option<Encoded> {
        let mut octets = [0u8; 4];
        let mut cur = pos;
        for (i, octet) in octets.iter_mut().enumerate() {
            let digits = digit_run(input, cur);
            if digits == 0 || digits > 3 {
                return None;
            }
            let piece = &input[cur..cur + digits];
            // "01" parses but would come back as "1".
            if digits > 1 && piece[0] == b'0' {
                return None;
            }
            *octet = u8::try_from(parse_digits(piece)?).ok()?;
            cur += digits;

            if i < 3 {
                if input.get(cur) != Some(&b'.') {
                    return None;
                }
                cur += 1;
            }
        }

        out.extend_from_slice(&octets);
        Some(Encoded { consumed: cur - pos, produced: 4 })
    }

    fn decompress(&self, buf: &[u8], pos: usize) -> Result<Decoded> {
        let o = payload(buf, pos, 4, self.name())?;
        let text = format!("{}.{}.{}.{}", o[0], o[1], o[2], o[3]);
        Ok(Decoded { consumed: 4, bytes: Cow::Owned(text.into_bytes()) })
    }
}
