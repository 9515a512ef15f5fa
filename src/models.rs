use serde::{Deserialize, Serialize};

// --- Giphy trending API wire shapes ---

/// Top-level trending response: `{ "data": [ ... ] }`. A response without
/// `data` is a decode failure surfaced at the invocation tier.
#[derive(Deserialize, Debug, Clone)]
pub struct TrendingResponse {
    pub data: Vec<TrendingEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrendingEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub images: Option<ImageSet>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ImageSet {
    #[serde(default)]
    pub original: Option<ImageRendition>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ImageRendition {
    pub url: String,
}

impl TrendingResponse {
    /// Keeps only entries tagged `gif`, mapped to their original-resolution
    /// URLs, in upstream order. Gif entries without an original rendition are
    /// dropped with a warning rather than failing the invocation.
    pub fn gif_urls(self) -> Vec<String> {
        self.data
            .into_iter()
            .filter(|entry| entry.kind == "gif")
            .filter_map(|entry| {
                let url = entry.images.and_then(|set| set.original).map(|r| r.url);
                if url.is_none() {
                    tracing::warn!("Trending entry tagged gif has no original rendition; skipping");
                }
                url
            })
            .collect()
    }
}

// --- Object-created notification batch (S3 event shape) ---

#[derive(Deserialize, Debug, Clone)]
pub struct NotificationBatch {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NotificationRecord {
    pub s3: S3Entity,
}

#[derive(Deserialize, Debug, Clone)]
pub struct S3Entity {
    pub object: ObjectRef,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ObjectRef {
    pub key: String,
}

impl NotificationRecord {
    pub fn key(&self) -> &str {
        &self.s3.object.key
    }
}

// --- Store write receipt ---

/// What a successful put hands back; surfaced verbatim in result slots so
/// callers can see which keys were written.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}
