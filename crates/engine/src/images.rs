//! Engine-side image byte store
//!
//! Catalog entries carry metadata only; the raw bytes live here and move in
//! fixed-size base64 chunks over the image channel.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dashmap::DashMap;
use thiserror::Error;

use tableforge_domain::ImageId;
use tableforge_protocol::{ImageChunk, IMAGE_CHUNK_SIZE};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image {0} not found")]
    UnknownImage(ImageId),
    #[error("No pending upload for image {0}")]
    UnknownUpload(ImageId),
    #[error("Upload size mismatch: declared {declared}, received {received}")]
    SizeMismatch { declared: u64, received: u64 },
    #[error("Chunk index {index} out of range ({total} chunks)")]
    ChunkOutOfRange { index: u32, total: u32 },
    #[error("Invalid base64 chunk: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A fully uploaded image
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct PendingUpload {
    name: String,
    mime_type: String,
    declared_size: u64,
    chunks: std::collections::BTreeMap<u32, Vec<u8>>,
}

/// Room-scoped image storage with chunked upload bookkeeping
#[derive(Default)]
pub struct ImageStore {
    images: DashMap<ImageId, StoredImage>,
    uploads: DashMap<ImageId, PendingUpload>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for an announced upload.
    pub fn register(&self, name: String, mime_type: String, declared_size: u64) -> ImageId {
        let image_id = ImageId::new();
        self.uploads.insert(
            image_id,
            PendingUpload {
                name,
                mime_type,
                declared_size,
                chunks: std::collections::BTreeMap::new(),
            },
        );
        image_id
    }

    /// Record one base64 chunk of a pending upload.
    pub fn add_chunk(&self, image_id: ImageId, index: u32, data: &str) -> Result<(), ImageError> {
        let bytes = BASE64.decode(data)?;
        let mut upload = self
            .uploads
            .get_mut(&image_id)
            .ok_or(ImageError::UnknownUpload(image_id))?;
        upload.chunks.insert(index, bytes);
        Ok(())
    }

    /// Assemble a pending upload and publish it.
    pub fn commit(&self, image_id: ImageId) -> Result<StoredImage, ImageError> {
        let (_, upload) = self
            .uploads
            .remove(&image_id)
            .ok_or(ImageError::UnknownUpload(image_id))?;
        let bytes: Vec<u8> = upload.chunks.into_values().flatten().collect();
        if bytes.len() as u64 != upload.declared_size {
            return Err(ImageError::SizeMismatch {
                declared: upload.declared_size,
                received: bytes.len() as u64,
            });
        }
        let stored = StoredImage {
            name: upload.name,
            mime_type: upload.mime_type,
            bytes,
        };
        self.images.insert(image_id, stored.clone());
        Ok(stored)
    }

    /// Insert a fully materialized image (save-file import path).
    pub fn insert(&self, image_id: ImageId, image: StoredImage) {
        self.images.insert(image_id, image);
    }

    pub fn get(&self, image_id: ImageId) -> Option<StoredImage> {
        self.images.get(&image_id).map(|i| i.clone())
    }

    /// One chunk of a stored image, base64-encoded for the wire.
    pub fn chunk(&self, image_id: ImageId, index: u32) -> Result<ImageChunk, ImageError> {
        let image = self
            .images
            .get(&image_id)
            .ok_or(ImageError::UnknownImage(image_id))?;
        let total = total_chunks(image.bytes.len());
        if index >= total {
            return Err(ImageError::ChunkOutOfRange {
                index,
                total,
            });
        }
        let start = index as usize * IMAGE_CHUNK_SIZE;
        let end = (start + IMAGE_CHUNK_SIZE).min(image.bytes.len());
        Ok(ImageChunk {
            image_id,
            index,
            total_chunks: total,
            data: BASE64.encode(&image.bytes[start..end]),
        })
    }
}

fn total_chunks(len: usize) -> u32 {
    len.div_ceil(IMAGE_CHUNK_SIZE) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_and_fetch_round_trip() {
        let store = ImageStore::new();
        let payload: Vec<u8> = (0..IMAGE_CHUNK_SIZE + 100).map(|i| (i % 251) as u8).collect();
        let image_id = store.register("map.png".into(), "image/png".into(), payload.len() as u64);

        for (index, chunk) in payload.chunks(IMAGE_CHUNK_SIZE).enumerate() {
            store
                .add_chunk(image_id, index as u32, &BASE64.encode(chunk))
                .expect("chunk accepted");
        }
        let stored = store.commit(image_id).expect("commit");
        assert_eq!(stored.bytes, payload);

        let first = store.chunk(image_id, 0).expect("chunk 0");
        assert_eq!(first.total_chunks, 2);
        let second = store.chunk(image_id, 1).expect("chunk 1");
        let mut rebuilt = BASE64.decode(first.data).expect("decode");
        rebuilt.extend(BASE64.decode(second.data).expect("decode"));
        assert_eq!(rebuilt, payload);
    }

    #[test]
    fn test_commit_rejects_size_mismatch() {
        let store = ImageStore::new();
        let image_id = store.register("map.png".into(), "image/png".into(), 10);
        store
            .add_chunk(image_id, 0, &BASE64.encode(b"short"))
            .expect("chunk accepted");
        let err = store.commit(image_id).expect_err("size mismatch");
        assert!(matches!(err, ImageError::SizeMismatch { .. }));
    }

    #[test]
    fn test_fetch_out_of_range_chunk() {
        let store = ImageStore::new();
        let image_id = ImageId::new();
        store.insert(
            image_id,
            StoredImage {
                name: "map.png".into(),
                mime_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            },
        );
        let err = store.chunk(image_id, 5).expect_err("out of range");
        assert!(matches!(err, ImageError::ChunkOutOfRange { total: 1, .. }));
    }
}
