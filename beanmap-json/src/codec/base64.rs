//! Standard base-64 alphabet with `=` padding
use std::vec::Vec;

use beanmap_write::{CharSink, SinkResult};

static ALPHABET: &[u8;64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[inline]
fn sextets_to_str<'a>(sextets: &[u8], out: &'a mut [u8;4]) -> &'a str {
    for (dst, n) in out.iter_mut().zip(sextets) {
        *dst = ALPHABET[(n & 0x3F) as usize];
    }
    for dst in out.iter_mut().skip(sextets.len()) {
        *dst = b'=';
    }
    // SAFETY: the buffer holds ASCII alphabet or padding characters only
    unsafe { core::str::from_utf8_unchecked(out) }
}

/// Encode `bytes` as padded base-64 text into `sink`
pub fn encode(sink: &mut dyn CharSink, bytes: &[u8]) -> SinkResult<()> {
    let mut buf = [0u8;4];
    let mut chunks = bytes.chunks_exact(3);
    for chunk in chunks.by_ref() {
        let (a, b, c) = (chunk[0], chunk[1], chunk[2]);
        let sextets = [a >> 2, (a << 4) | (b >> 4), (b << 2) | (c >> 6), c];
        sink.write_str(sextets_to_str(&sextets, &mut buf))?;
    }
    match *chunks.remainder() {
        [a, b] => {
            let sextets = [a >> 2, (a << 4) | (b >> 4), b << 2];
            sink.write_str(sextets_to_str(&sextets, &mut buf))?;
        }
        [a] => {
            let sextets = [a >> 2, a << 4];
            sink.write_str(sextets_to_str(&sextets, &mut buf))?;
        }
        _ => {}
    }
    Ok(())
}

#[inline]
fn get_code(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'/' => Some(63),
        b'+' => Some(62),
        _ => None
    }
}

/// Decode base-64 `text`, with or without padding.
///
/// Returns `None` on a character outside of the alphabet, on misplaced
/// padding, or on a dangling single character.
pub fn decode(text: &str) -> Option<Vec<u8>> {
    let trimmed = text.trim_end_matches('=');
    if text.len() - trimmed.len() > 2 {
        return None
    }
    let bytes = trimmed.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 3 / 4);
    let mut chunks = bytes.chunks(4);
    for chunk in chunks.by_ref() {
        let packed = chunk.iter().try_fold(0u32, |acc, &c| {
            get_code(c).map(|code| (acc << 6) | u32::from(code))
        })?;
        match chunk.len() {
            4 => out.extend_from_slice(&[(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]),
            3 => out.extend_from_slice(&[(packed >> 10) as u8, (packed >> 2) as u8]),
            2 => out.push((packed >> 4) as u8),
            _ => return None
        }
    }
    Some(out)
}
