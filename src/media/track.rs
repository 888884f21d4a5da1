use super::error::MediaResult;
use super::pipeline::{ChunkPipeline, Sleeper};
use super::store::DocumentStore;
use serde::{Deserialize, Serialize};

/// Where a track's audio lives. Chunked tracks are checked first, so a record
/// carrying both chunk ids and a legacy url plays from the chunks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackSource {
    Chunked {
        #[serde(rename = "chunkIds")]
        chunk_ids: Vec<String>,
    },
    Url {
        url: String,
    },
    Inline {
        data: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(flatten)]
    pub source: TrackSource,
}

impl<S, T> ChunkPipeline<'_, S, T>
where
    S: DocumentStore + ?Sized,
    T: Sleeper + ?Sized,
{
    /// Resolve a track to something a media element can play: a URL or a
    /// data URL.
    pub async fn resolve(
        &self,
        source: &TrackSource,
        progress: impl FnMut(f32),
    ) -> MediaResult<String> {
        match source {
            TrackSource::Chunked { chunk_ids } => self.load(chunk_ids, progress).await,
            TrackSource::Url { url } => Ok(url.clone()),
            TrackSource::Inline { data } => Ok(data.clone()),
        }
    }
}
