use bytes::{BufMut, BytesMut};

use crate::error::Result;

/// Frame delimiter: a single NUL byte.
///
/// UTF-8 JSON text never contains NUL, so delimiter scanning needs no
/// escaping and is the only framing mechanism on the wire.
pub const DELIMITER: u8 = 0x00;

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────────┬─────────────────┐
/// │ Payload (UTF-8 JSON)     │ Delimiter (1B)  │
/// │                          │ 0x00            │
/// └──────────────────────────┴─────────────────┘
/// ```
pub fn encode_frame(payload: &str, dst: &mut BytesMut) {
    dst.reserve(payload.len() + 1);
    dst.put_slice(payload.as_bytes());
    dst.put_u8(DELIMITER);
}

/// Split a raw read chunk into complete frames.
///
/// `pending` holds the bytes of an unterminated frame left over from
/// earlier chunks. The first delimiter in `chunk` completes it; any
/// trailing bytes after the last delimiter become the new pending content.
///
/// Returns the complete frames in wire order, already delimiter-stripped
/// and decoded to text. The first segment of a chunk may legally be empty
/// (the stream starts with a delimiter and yields a zero-length frame);
/// later empty segments are bare boundaries and are dropped.
///
/// Splitting happens at the byte level, so a chunk boundary inside a
/// multibyte UTF-8 sequence is harmless: only complete frames are decoded.
///
/// On error nothing is consumed: `pending` keeps its prior content and no
/// frames from the chunk are delivered.
pub fn split_frames(chunk: &[u8], pending: &mut BytesMut) -> Result<Vec<String>> {
    if !chunk.contains(&DELIMITER) {
        pending.extend_from_slice(chunk);
        return Ok(Vec::new());
    }

    let mut segments: Vec<&[u8]> = chunk.split(|&b| b == DELIMITER).collect();
    // `split` yields delimiter-count + 1 segments, so there are at least
    // two here; the last is whatever followed the final delimiter.
    let tail = segments.pop().unwrap_or_default();

    // Decode every completed frame before touching `pending`, so a bad
    // frame leaves the buffer state exactly as it was.
    let mut frames = Vec::with_capacity(segments.len());
    for (idx, segment) in segments.iter().enumerate() {
        if idx == 0 && !pending.is_empty() {
            let mut completed = Vec::with_capacity(pending.len() + segment.len());
            completed.extend_from_slice(pending);
            completed.extend_from_slice(segment);
            frames.push(decode(&completed)?);
        } else if idx == 0 || !segment.is_empty() {
            frames.push(decode(segment)?);
        }
    }

    pending.clear();
    pending.extend_from_slice(tail);
    Ok(frames)
}

fn decode(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;

    #[test]
    fn encode_appends_delimiter() {
        let mut wire = BytesMut::new();
        encode_frame(r#"{"status":"shell_output"}"#, &mut wire);

        assert_eq!(wire.last(), Some(&DELIMITER));
        assert_eq!(&wire[..wire.len() - 1], br#"{"status":"shell_output"}"#);
    }

    #[test]
    fn roundtrip_single_frame() {
        let payload = r#"{"status":"input_response","input":"ls"}"#;
        let mut wire = BytesMut::new();
        encode_frame(payload, &mut wire);

        let mut pending = BytesMut::new();
        let frames = split_frames(&wire, &mut pending).unwrap();

        assert_eq!(frames, vec![payload.to_string()]);
        assert!(pending.is_empty());
    }

    #[test]
    fn no_delimiter_goes_to_pending() {
        let mut pending = BytesMut::new();
        let frames = split_frames(b"partialfrag", &mut pending).unwrap();

        assert!(frames.is_empty());
        assert_eq!(pending.as_ref(), b"partialfrag");
    }

    #[test]
    fn byte_by_byte_yields_frame_only_at_delimiter() {
        let payload = r#"{"status":"input_request","prompt":">>> "}"#;
        let mut wire = BytesMut::new();
        encode_frame(payload, &mut wire);

        let mut pending = BytesMut::new();
        let mut all = Vec::new();
        for (idx, byte) in wire.iter().enumerate() {
            let frames = split_frames(&[*byte], &mut pending).unwrap();
            if idx < wire.len() - 1 {
                assert!(frames.is_empty(), "frame produced before final byte");
            }
            all.extend(frames);
        }

        assert_eq!(all, vec![payload.to_string()]);
        assert!(pending.is_empty());
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        let mut wire = BytesMut::new();
        encode_frame(r#"{"a":1}"#, &mut wire);
        encode_frame(r#"{"b":2}"#, &mut wire);
        encode_frame(r#"{"c":3}"#, &mut wire);

        let mut pending = BytesMut::new();
        let frames = split_frames(&wire, &mut pending).unwrap();

        assert_eq!(frames, vec![r#"{"a":1}"#, r#"{"b":2}"#, r#"{"c":3}"#]);
        assert!(pending.is_empty());
    }

    #[test]
    fn partial_then_completion_preserves_order() {
        let mut pending = BytesMut::new();

        let frames = split_frames(b"partialfrag", &mut pending).unwrap();
        assert!(frames.is_empty());

        let frames = split_frames(b"ment\x00full\x00", &mut pending).unwrap();
        assert_eq!(frames, vec!["partialfragment", "full"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn trailing_bytes_become_new_pending() {
        let mut pending = BytesMut::new();
        let frames = split_frames(b"one\x00two\x00tr", &mut pending).unwrap();

        assert_eq!(frames, vec!["one", "two"]);
        assert_eq!(pending.as_ref(), b"tr");
    }

    #[test]
    fn leading_delimiter_is_a_legal_empty_frame() {
        let mut pending = BytesMut::new();
        let frames = split_frames(b"\x00msg\x00", &mut pending).unwrap();

        assert_eq!(frames, vec!["", "msg"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn consecutive_delimiters_drop_interior_empties() {
        let mut pending = BytesMut::new();
        let frames = split_frames(b"a\x00\x00\x00b\x00", &mut pending).unwrap();

        assert_eq!(frames, vec!["a", "b"]);
    }

    #[test]
    fn utf8_split_across_chunks_is_harmless() {
        // "héllo" with the two-byte 'é' split across reads.
        let encoded = "h\u{e9}llo".as_bytes();
        let mut pending = BytesMut::new();

        let frames = split_frames(&encoded[..2], &mut pending).unwrap();
        assert!(frames.is_empty());

        let mut rest = encoded[2..].to_vec();
        rest.push(DELIMITER);
        let frames = split_frames(&rest, &mut pending).unwrap();
        assert_eq!(frames, vec!["h\u{e9}llo"]);
    }

    #[test]
    fn invalid_utf8_frame_is_rejected() {
        let mut pending = BytesMut::new();
        let err = split_frames(b"\xff\xfe\x00", &mut pending).unwrap_err();
        assert!(matches!(err, FrameError::Utf8(_)));
    }

    #[test]
    fn invalid_utf8_consumes_nothing() {
        let mut pending = BytesMut::from(&b"par"[..]);
        let err = split_frames(b"tial\x00\xff\x00", &mut pending).unwrap_err();

        assert!(matches!(err, FrameError::Utf8(_)));
        // The first frame of the chunk would have decoded fine, but the
        // error path must leave the buffer exactly as it was.
        assert_eq!(pending.as_ref(), b"par");
    }
}
