//! Chunked image fetch
//!
//! Pulls an image from the engine chunk by chunk with bounded parallelism.
//! This is the only place in the system with retry logic: a failed chunk is
//! retried a fixed number of times with a fixed delay before the whole fetch
//! fails.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;

use tableforge_domain::ImageId;
use tableforge_protocol::{ImageChunk, ImageRequest, RequestError, RequestPayload, ResponseResult};

use crate::connection::GameConnectionPort;

/// Chunks fetched concurrently
const MAX_PARALLEL_FETCHES: usize = 4;
/// Retries per chunk before the fetch fails
const CHUNK_RETRIES: u32 = 3;
/// Delay between chunk retries
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Engine rejected chunk fetch: {0}")]
    Rejected(String),
    #[error("Malformed chunk payload: {0}")]
    MalformedChunk(String),
    #[error("Invalid base64 in chunk: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Fetch an image's full byte payload.
pub async fn fetch_image(
    connection: &dyn GameConnectionPort,
    image_id: ImageId,
) -> Result<Vec<u8>, ImageFetchError> {
    // The first chunk tells us how many there are.
    let first = fetch_chunk_with_retry(connection, image_id, 0).await?;
    let total = first.total_chunks;
    let mut chunks: Vec<Option<Vec<u8>>> = vec![None; total as usize];
    chunks[0] = Some(BASE64.decode(&first.data)?);

    let remaining: Vec<u32> = (1..total).collect();
    let fetched: Vec<(u32, Vec<u8>)> = stream::iter(remaining)
        .map(|index| async move {
            let chunk = fetch_chunk_with_retry(connection, image_id, index).await?;
            let bytes = BASE64.decode(&chunk.data)?;
            Ok::<_, ImageFetchError>((index, bytes))
        })
        .buffer_unordered(MAX_PARALLEL_FETCHES)
        .try_collect()
        .await?;

    for (index, bytes) in fetched {
        chunks[index as usize] = Some(bytes);
    }
    Ok(chunks.into_iter().flatten().flatten().collect())
}

async fn fetch_chunk_with_retry(
    connection: &dyn GameConnectionPort,
    image_id: ImageId,
    index: u32,
) -> Result<ImageChunk, ImageFetchError> {
    let mut last_error = None;
    for attempt in 0..=CHUNK_RETRIES {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY).await;
            tracing::debug!(image_id = %image_id, index, attempt, "Retrying image chunk");
        }
        match fetch_chunk(connection, image_id, index).await {
            Ok(chunk) => return Ok(chunk),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or(ImageFetchError::Request(RequestError::Cancelled)))
}

async fn fetch_chunk(
    connection: &dyn GameConnectionPort,
    image_id: ImageId,
    index: u32,
) -> Result<ImageChunk, ImageFetchError> {
    let result = connection
        .request(RequestPayload::Image(ImageRequest::Fetch {
            image_id,
            index,
        }))
        .await?;
    match result {
        ResponseResult::Success { data: Some(data) } => serde_json::from_value(data)
            .map_err(|e| ImageFetchError::MalformedChunk(e.to_string())),
        ResponseResult::Success { data: None } => {
            Err(ImageFetchError::MalformedChunk("empty chunk response".into()))
        }
        ResponseResult::Error { message, .. } => Err(ImageFetchError::Rejected(message)),
        ResponseResult::Unknown => {
            Err(ImageFetchError::MalformedChunk("unrecognized response".into()))
        }
    }
}
