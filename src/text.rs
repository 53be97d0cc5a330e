//! ASCII and UTF-8 string emission/decoding (spec §4.4, plus the
//! "ASCII emitter" leaf component of §2 used by `NUMBER`, `BIGINT`, and
//! `DATE` payloads, all of which are ASCII decimal or ISO-8601 text).

use crate::error::{Error, Result};
use crate::length;
use crate::tag::Tag;

/// Size of the reusable staging buffer streamed through while emitting a
/// non-empty `STRING` payload (spec §4.4's recommended value).
pub const MAX_CHUNK: usize = 65536;

/// Emit text known to be ASCII (a `NUMBER`, `BIGINT`, or `DATE` payload):
/// tag, then length-prefixed bytes. No speculative slot is needed here
/// because the byte length is already known up front — unlike `STRING`,
/// nothing is streamed chunk-by-chunk.
pub fn emit_ascii(buf: &mut Vec<u8>, tag: u8, text: &str) {
    debug_assert!(text.is_ascii());
    buf.push(tag);
    length::write(buf, text.len() as u64);
    buf.extend_from_slice(text.as_bytes());
}

/// Emit a `STRING` payload using the speculative three-byte length slot
/// described in spec §4.4.
///
/// The slot reserves a tag byte plus a one-byte width and one-byte length,
/// sized for the common case of strings under 256 bytes. Text is streamed
/// through a fixed-size staging buffer in `MAX_CHUNK` pieces (matching the
/// host-adapter chunked-iteration capability of §6.1) purely to mirror the
/// architecture; the computed total then either overwrites the reserved
/// slot in place or, for longer strings, is spliced in at the correct
/// width, shifting the bytes already written.
pub fn emit_string(buf: &mut Vec<u8>, text: &str) {
    let l0 = buf.len();
    buf.push(Tag::STRING);
    if text.is_empty() {
        length::write(buf, 0);
        return;
    }
    buf.push(0); // placeholder width byte
    buf.push(0); // placeholder length byte, good for T in 1..=255

    let bytes = text.as_bytes();
    let mut staging = [0u8; MAX_CHUNK];
    let mut consumed = 0;
    while consumed < bytes.len() {
        let take = MAX_CHUNK.min(bytes.len() - consumed);
        staging[..take].copy_from_slice(&bytes[consumed..consumed + take]);
        buf.extend_from_slice(&staging[..take]);
        consumed += take;
    }

    let total = bytes.len() as u64;
    let mut scratch = Vec::new();
    length::write(&mut scratch, total);

    let slot = l0 + 1;
    if scratch.len() == 2 {
        buf[slot] = scratch[0];
        buf[slot + 1] = scratch[1];
    } else {
        buf.splice(slot..slot + 2, scratch);
    }
}

/// Read a length-prefixed byte slice at `pos`. `base` is the offset of
/// `data[0]` in the overall stream, for error reporting. Fails with
/// [`Error::TruncatedStream`] if fewer bytes remain than the prefix
/// declares.
pub fn read_bytes<'a>(data: &'a [u8], pos: usize, base: usize) -> Result<(&'a [u8], usize)> {
    let (len, after_len) = length::read(data, pos, base)?;
    let len = len as usize;
    let remaining = data.len() - after_len;
    if remaining < len {
        return Err(Error::TruncatedStream {
            offset: base + after_len,
            needed: len,
            remaining,
        });
    }
    Ok((&data[after_len..after_len + len], after_len + len))
}

/// Read and validate a `STRING` payload's UTF-8 bytes.
pub fn read_utf8<'a>(data: &'a [u8], pos: usize, base: usize) -> Result<(&'a str, usize)> {
    let (slice, pos) = read_bytes(data, pos, base)?;
    let text = std::str::from_utf8(slice).map_err(|_| Error::MalformedString { offset: base + pos })?;
    Ok((text, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_two_bytes() {
        let mut buf = Vec::new();
        emit_string(&mut buf, "");
        assert_eq!(buf, vec![Tag::STRING, 0]);
    }

    #[test]
    fn spec_example_hi() {
        // S3: encode("hi") -> [s, 1, 2, 0x68, 0x69]
        let mut buf = Vec::new();
        emit_string(&mut buf, "hi");
        assert_eq!(buf, vec![Tag::STRING, 1, 2, 0x68, 0x69]);
    }

    #[test]
    fn long_string_splices_a_wider_prefix() {
        let text = "x".repeat(300);
        let mut buf = Vec::new();
        emit_string(&mut buf, &text);
        assert_eq!(buf[0], Tag::STRING);
        let (read_back, pos) = read_utf8(&buf, 1, 0).unwrap();
        assert_eq!(read_back, text);
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn roundtrips_multibyte_text() {
        let text = "héllo wörld — 日本語";
        let mut buf = Vec::new();
        emit_string(&mut buf, text);
        let (read_back, pos) = read_utf8(&buf, 1, 0).unwrap();
        assert_eq!(read_back, text);
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn invalid_utf8_is_malformed_string() {
        let mut buf = vec![Tag::STRING];
        length::write(&mut buf, 1);
        buf.push(0xff);
        let err = read_utf8(&buf, 1, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedString { .. }));
    }

    #[test]
    fn truncated_payload_is_truncated_stream() {
        let mut buf = vec![Tag::STRING];
        length::write(&mut buf, 5);
        buf.push(b'h');
        let err = read_utf8(&buf, 1, 0).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { .. }));
    }

    #[test]
    fn ascii_emitter_matches_spec_number_example() {
        // S4: encode(42) -> [N, 1, 2, '4', '2']
        let mut buf = Vec::new();
        emit_ascii(&mut buf, Tag::NUMBER, "42");
        assert_eq!(buf, vec![Tag::NUMBER, 1, 2, b'4', b'2']);
    }
}
