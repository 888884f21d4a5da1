//! Chunk arithmetic and the data-URL text encoding of chunk payloads.

use super::constants::{FALLBACK_MIME, FILE_ID_PREFIX, FILE_ID_SUFFIX_LEN};
use super::error::{MediaError, MediaResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;

/// Round a requested chunk size down to a multiple of 3.
pub fn effective_chunk_size(requested: usize) -> MediaResult<usize> {
    if requested < 3 {
        return Err(MediaError::InvalidChunkSize { size: requested });
    }
    let size = requested - requested % 3;
    if size != requested {
        log::warn!(
            "[media] chunk size {} is not a multiple of 3, using {}",
            requested,
            size
        );
    }
    Ok(size)
}

/// Chunks needed for `len` bytes. An empty file still gets one chunk so the
/// stored stream always carries its header.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size).max(1)
}

pub fn chunk_key(file_id: &str, index: usize) -> String {
    format!("{file_id}_chunk_{index}")
}

/// `audio_<unix ms>_<9 base-36 chars>`. Unique enough for one uploader, not
/// collision-proof.
pub fn generate_file_id<R: Rng + ?Sized>(unix_ms: u64, rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..FILE_ID_SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{FILE_ID_PREFIX}_{unix_ms}_{suffix}")
}

pub fn data_url_header(mime: &str) -> String {
    let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
    format!("data:{mime};base64,")
}

/// Base64 length of `len` binary bytes.
pub fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Text payload for one chunk; only chunk 0 carries the header.
pub fn encode_chunk(bytes: &[u8], index: usize, mime: &str) -> String {
    let body = STANDARD.encode(bytes);
    if index == 0 {
        let mut out = data_url_header(mime);
        out.push_str(&body);
        out
    } else {
        body
    }
}

/// Split a reassembled stream into its MIME type and base64 body.
pub fn split_data_url(stream: &str) -> MediaResult<(&str, &str)> {
    let rest = stream
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::Decode("missing `data:` prefix".into()))?;
    let (meta, body) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::Decode("missing `,` after header".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| MediaError::Decode(format!("unsupported encoding in `{meta}`")))?;
    Ok((mime, body))
}

/// Decode a reassembled stream back to its MIME type and original bytes.
pub fn decode_data_url(stream: &str) -> MediaResult<(String, Vec<u8>)> {
    let (mime, body) = split_data_url(stream)?;
    let bytes = STANDARD
        .decode(body)
        .map_err(|e| MediaError::Decode(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn chunk_size_rounds_down_to_multiple_of_three() {
        assert_eq!(effective_chunk_size(1_048_576).unwrap(), 1_048_575);
        assert_eq!(effective_chunk_size(3).unwrap(), 3);
        assert!(matches!(
            effective_chunk_size(2),
            Err(MediaError::InvalidChunkSize { size: 2 })
        ));
    }

    #[test]
    fn empty_file_still_has_one_chunk() {
        assert_eq!(chunk_count(0, 3), 1);
        assert_eq!(chunk_count(3, 3), 1);
        assert_eq!(chunk_count(4, 3), 2);
    }

    #[test]
    fn file_id_has_prefix_timestamp_and_suffix() {
        let mut rng = StdRng::seed_from_u64(3);
        let id = generate_file_id(1_700_000_000_000, &mut rng);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts[0], "audio");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), FILE_ID_SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn first_chunk_alone_carries_header() {
        assert_eq!(encode_chunk(b"abc", 0, "audio/mpeg"), "data:audio/mpeg;base64,YWJj");
        assert_eq!(encode_chunk(b"abc", 1, "audio/mpeg"), "YWJj");
        assert_eq!(encode_chunk(b"", 0, ""), "data:application/octet-stream;base64,");
    }

    #[test]
    fn decode_rejects_streams_without_header() {
        assert!(decode_data_url("YWJj").is_err());
        assert!(decode_data_url("data:audio/wav,abc").is_err());
        let (mime, bytes) = decode_data_url("data:audio/wav;base64,YWJj").unwrap();
        assert_eq!(mime, "audio/wav");
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn encoded_len_matches_base64() {
        for len in 0..10 {
            assert_eq!(encoded_len(len), STANDARD.encode(vec![0u8; len]).len());
        }
    }
}
