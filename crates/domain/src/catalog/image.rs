//! Image metadata catalog entry
//!
//! Only metadata lives in the snapshot; raw bytes move over the dedicated
//! chunked image channel and are stored engine-side.

use serde::{Deserialize, Serialize};

use crate::ids::ImageId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub id: ImageId,
    pub name: String,
    /// MIME type, e.g. "image/png"
    pub mime_type: String,
    /// Total size in bytes
    pub size: u64,
}

impl ImageMeta {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            id: ImageId::new(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}
