// Chunked media pipeline defaults.

/// Collection holding one document per chunk.
pub const CHUNK_COLLECTION: &str = "audio_chunks";

/// Binary bytes per chunk. A multiple of 3 so per-chunk base64 concatenates
/// without interior padding; encodes to 1,020,000 characters.
pub const DEFAULT_CHUNK_SIZE: usize = 765_000;

/// Largest text payload written as a single document, leaving headroom for
/// the data-URL header and the other chunk fields under a 1 MiB document cap.
pub const MAX_CHUNK_PAYLOAD_LEN: usize = 1_040_000;

/// Pause between sequential chunk writes.
pub const PACING_DELAY_MS: u64 = 100;

/// Overall deadline for one upload or load.
pub const OPERATION_TIMEOUT_MS: u64 = 15_000;

pub const FILE_ID_PREFIX: &str = "audio";
pub const FILE_ID_SUFFIX_LEN: usize = 9;
pub const FALLBACK_MIME: &str = "application/octet-stream";
