//! Upload and reassembly of chunked audio.
//!
//! Upload walks the source in fixed-size byte slices, encodes each slice on
//! its own and writes one document per slice, strictly one after another.
//! Load fetches every chunk concurrently and reassembles by position in the
//! caller's key list, never by completion order.

use super::constants::*;
use super::encode::{
    chunk_count, chunk_key, data_url_header, effective_chunk_size, encode_chunk, encoded_len,
    generate_file_id,
};
use super::error::{MediaError, MediaResult};
use super::store::{ChunkDocument, DocumentStore};
use futures_util::future::{select, Either};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use std::cell::Cell;
use std::future::Future;
use std::ops::Range;
use std::pin::pin;
use std::time::Duration;

/// Binary payload that can be read slice by slice.
#[allow(async_fn_in_trait)]
pub trait MediaSource {
    fn len(&self) -> usize;
    fn mime_type(&self) -> &str;
    async fn read(&self, range: Range<usize>) -> MediaResult<Vec<u8>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fully buffered source.
#[derive(Clone, Debug)]
pub struct MediaBuffer {
    bytes: Vec<u8>,
    mime: String,
}

impl MediaBuffer {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl MediaSource for MediaBuffer {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    async fn read(&self, range: Range<usize>) -> MediaResult<Vec<u8>> {
        self.bytes
            .get(range.clone())
            .map(<[u8]>::to_vec)
            .ok_or_else(|| MediaError::Source {
                start: range.start,
                end: range.end,
                succeeded: 0,
                message: format!("out of bounds for {} bytes", self.bytes.len()),
            })
    }
}

/// Timer used for write pacing and deadlines.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingChunkPolicy {
    /// Abort reassembly.
    #[default]
    Fail,
    /// Leave the chunk's contribution out and keep going.
    Skip,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub max_payload_len: usize,
    pub pacing_ms: u64,
    pub timeout_ms: Option<u64>,
    pub collection: String,
    pub missing_chunk_policy: MissingChunkPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_payload_len: MAX_CHUNK_PAYLOAD_LEN,
            pacing_ms: PACING_DELAY_MS,
            timeout_ms: Some(OPERATION_TIMEOUT_MS),
            collection: CHUNK_COLLECTION.to_string(),
            missing_chunk_policy: MissingChunkPolicy::Fail,
        }
    }
}

impl PipelineConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Race `fut` against a deadline. `None` waits forever. On timeout the
/// error carries the value of `done` at the moment the deadline fired.
pub async fn with_timeout<T, F, S>(
    sleeper: &S,
    after: Option<Duration>,
    done: &Cell<usize>,
    fut: F,
) -> MediaResult<T>
where
    F: Future<Output = MediaResult<T>>,
    S: Sleeper + ?Sized,
{
    let Some(after) = after else {
        return fut.await;
    };
    let work = pin!(fut);
    let deadline = pin!(sleeper.sleep(after));
    match select(work, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(MediaError::Timeout {
            after,
            succeeded: done.get(),
        }),
    }
}

pub struct ChunkPipeline<'a, S: ?Sized, T: ?Sized> {
    store: &'a S,
    sleeper: &'a T,
    config: PipelineConfig,
}

impl<'a, S, T> ChunkPipeline<'a, S, T>
where
    S: DocumentStore + ?Sized,
    T: Sleeper + ?Sized,
{
    pub fn new(store: &'a S, sleeper: &'a T, config: PipelineConfig) -> Self {
        Self {
            store,
            sleeper,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Upload under a freshly generated file id. Returns the chunk keys in
    /// index order; the caller stores them with the owning track.
    pub async fn upload<M>(&self, source: &M, progress: impl FnMut(f32)) -> MediaResult<Vec<String>>
    where
        M: MediaSource + ?Sized,
    {
        let file_id = generate_file_id(unix_millis(), &mut rand::thread_rng());
        self.upload_as(source, &file_id, progress).await
    }

    pub async fn upload_as<M>(
        &self,
        source: &M,
        file_id: &str,
        mut progress: impl FnMut(f32),
    ) -> MediaResult<Vec<String>>
    where
        M: MediaSource + ?Sized,
    {
        let done = Cell::new(0);
        with_timeout(
            self.sleeper,
            self.config.timeout(),
            &done,
            self.write_chunks(source, file_id, &done, &mut progress),
        )
        .await
    }

    async fn write_chunks<M>(
        &self,
        source: &M,
        file_id: &str,
        done: &Cell<usize>,
        progress: &mut dyn FnMut(f32),
    ) -> MediaResult<Vec<String>>
    where
        M: MediaSource + ?Sized,
    {
        let chunk_size = effective_chunk_size(self.config.chunk_size)?;
        let total_len = source.len();
        let total = chunk_count(total_len, chunk_size);
        let mime = source.mime_type();

        // chunk 0 is the largest payload: a full slice plus the header
        let largest = data_url_header(mime).len() + encoded_len(chunk_size.min(total_len));
        if largest > self.config.max_payload_len {
            return Err(MediaError::PayloadTooLarge {
                index: 0,
                len: largest,
                limit: self.config.max_payload_len,
            });
        }

        log::info!(
            "[upload] {}: {} bytes in {} chunks of {}",
            file_id,
            total_len,
            total,
            chunk_size
        );

        let mut keys = Vec::with_capacity(total);
        for index in 0..total {
            let start = index * chunk_size;
            let end = (start + chunk_size).min(total_len);
            let data = {
                let bytes = source
                    .read(start..end)
                    .await
                    .map_err(|e| e.after_chunks(keys.len()))?;
                encode_chunk(&bytes, index, mime)
            };
            let key = chunk_key(file_id, index);
            let doc = ChunkDocument {
                data,
                index,
                file_id: file_id.to_string(),
                total_chunks: total,
            };
            let written = match serde_json::to_value(doc) {
                Ok(value) => self.store.put(&self.config.collection, &key, value).await,
                Err(e) => Err(e.into()),
            };
            if let Err(err) = written {
                log::error!(
                    "[upload] chunk {} of {} failed after {} succeeded: {}",
                    index,
                    total,
                    keys.len(),
                    err
                );
                return Err(MediaError::Store {
                    index,
                    succeeded: keys.len(),
                    source: err,
                });
            }
            keys.push(key);
            done.set(keys.len());
            let pct = keys.len() as f32 / total as f32 * 100.0;
            log::debug!("[upload] chunk {} stored ({:.0}%)", index, pct);
            progress(pct);

            let pacing = self.config.pacing();
            if !pacing.is_zero() && index + 1 < total {
                self.sleeper.sleep(pacing).await;
            }
        }
        log::info!("[upload] {} complete", file_id);
        Ok(keys)
    }

    /// Fetch every chunk in `keys` and return the reassembled data URL.
    pub async fn load(&self, keys: &[String], mut progress: impl FnMut(f32)) -> MediaResult<String> {
        let done = Cell::new(0);
        with_timeout(
            self.sleeper,
            self.config.timeout(),
            &done,
            self.read_chunks(keys, &done, &mut progress),
        )
        .await
    }

    async fn read_chunks(
        &self,
        keys: &[String],
        done: &Cell<usize>,
        progress: &mut dyn FnMut(f32),
    ) -> MediaResult<String> {
        let total = keys.len();
        let collection = self.config.collection.as_str();
        let mut slots: Vec<Option<String>> = vec![None; total];
        let mut reads: FuturesUnordered<_> = keys
            .iter()
            .enumerate()
            .map(|(index, key)| async move { (index, self.store.get(collection, key).await) })
            .collect();

        let mut completed = 0usize;
        while let Some((index, result)) = reads.next().await {
            let key = &keys[index];
            let doc = result.map_err(|source| MediaError::Store {
                index,
                succeeded: completed,
                source,
            })?;
            completed += 1;
            done.set(completed);
            progress(completed as f32 / total as f32 * 100.0);

            let Some(doc) = doc else {
                match self.config.missing_chunk_policy {
                    MissingChunkPolicy::Fail => {
                        return Err(MediaError::MissingChunk {
                            index,
                            key: key.clone(),
                        })
                    }
                    MissingChunkPolicy::Skip => {
                        log::warn!("[load] chunk {} ({}) missing, skipping", index, key);
                        continue;
                    }
                }
            };
            let chunk: ChunkDocument =
                serde_json::from_value(doc).map_err(|e| MediaError::MalformedChunk {
                    index,
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            slots[index] = Some(chunk.data);
        }

        let stream: String = slots.into_iter().flatten().collect();
        log::info!("[load] reassembled {} chunks, {} chars", total, stream.len());
        Ok(stream)
    }

    /// Delete the chunk documents behind `keys`. Chunks are not removed
    /// automatically when a track goes away; callers purge explicitly.
    pub async fn purge(&self, keys: &[String]) -> MediaResult<usize> {
        for (index, key) in keys.iter().enumerate() {
            self.store
                .delete(&self.config.collection, key)
                .await
                .map_err(|source| MediaError::Store {
                    index,
                    succeeded: index,
                    source,
                })?;
        }
        Ok(keys.len())
    }
}

#[cfg(target_arch = "wasm32")]
fn unix_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
