//! Chunked image transfer request types
//!
//! Raw image bytes never ride inside the snapshot; they move through this
//! family in fixed-size base64 chunks.

use serde::{Deserialize, Serialize};

use tableforge_domain::ImageId;

/// Chunk payload size in raw bytes, before base64 encoding
pub const IMAGE_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageRequest {
    /// DM-only: announce an upload and reserve an image id
    Register {
        name: String,
        mime_type: String,
        size: u64,
    },
    /// DM-only: one chunk of a registered upload
    UploadChunk {
        image_id: ImageId,
        index: u32,
        /// Raw chunk bytes, base64-encoded
        data: String,
    },
    /// DM-only: finish an upload and publish the catalog entry
    Commit { image_id: ImageId },
    /// Fetch one chunk of a stored image
    Fetch { image_id: ImageId, index: u32 },
}

/// Response data for `ImageRequest::Fetch`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChunk {
    pub image_id: ImageId,
    pub index: u32,
    pub total_chunks: u32,
    /// Raw chunk bytes, base64-encoded
    pub data: String,
}
