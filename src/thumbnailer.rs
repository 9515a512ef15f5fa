use crate::domain::ObjectStore;
use crate::errors::{ErrorBody, ThumbnailError};
use crate::keys;
use crate::models::{NotificationBatch, NotificationRecord, PutReceipt};
use futures::stream::{self, StreamExt};
use image::{GenericImageView, imageops::FilterType};
use serde::Serialize;
use std::io::Cursor;
use tracing;

/// Fixed thumbnail width in pixels; height follows the source aspect ratio.
pub const THUMBNAIL_WIDTH: u32 = 100;

/// Per-record result slot; one per notification, in batch order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThumbnailOutcome {
    Stored {
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        etag: Option<String>,
    },
    Failed {
        source_key: String,
        error: ErrorBody,
    },
}

/// Decodes an image, scales it to [`THUMBNAIL_WIDTH`] preserving aspect
/// ratio, and re-encodes it in the sniffed source format. Pure: the output
/// bytes depend only on the input bytes, so reprocessing an unchanged
/// original yields a byte-identical thumbnail.
pub fn render_thumbnail(data: &[u8]) -> Result<Vec<u8>, ThumbnailError> {
    let format = image::guess_format(data).map_err(ThumbnailError::Decode)?;
    let img =
        image::load_from_memory_with_format(data, format).map_err(ThumbnailError::Decode)?;

    let (width, height) = img.dimensions();
    let target_height = scaled_height(width, height)?;

    let thumbnail = img.resize_exact(THUMBNAIL_WIDTH, target_height, FilterType::Lanczos3);

    let mut buffer = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut buffer, format)
        .map_err(ThumbnailError::Encode)?;
    Ok(buffer.into_inner())
}

/// Proportional height for a [`THUMBNAIL_WIDTH`]-wide thumbnail, at least 1.
/// Extreme aspect ratios (a 1 px-wide, tens-of-millions-tall source) would
/// overflow u32 after scaling; those are rejected rather than truncated.
fn scaled_height(width: u32, height: u32) -> Result<u32, ThumbnailError> {
    if width == 0 || height == 0 {
        return Err(ThumbnailError::EmptyImage);
    }
    let scaled = (height as u64 * THUMBNAIL_WIDTH as u64) / width as u64;
    u32::try_from(scaled)
        .map(|h| h.max(1))
        .map_err(|_| ThumbnailError::HeightOverflow { width, height })
}

/// Runs one Thumbnailer invocation over a notification batch. Records are
/// processed concurrently, bounded by `fan_out_limit`, with one outcome slot
/// per record in batch order; a failing record never aborts its siblings.
pub async fn process(
    store: &dyn ObjectStore,
    batch: NotificationBatch,
    fan_out_limit: usize,
) -> Vec<ThumbnailOutcome> {
    tracing::info!(records = batch.records.len(), "Processing object-created batch");

    stream::iter(batch.records.into_iter())
        .map(|record| process_record(store, record))
        .buffered(fan_out_limit)
        .collect()
        .await
}

async fn process_record(store: &dyn ObjectStore, record: NotificationRecord) -> ThumbnailOutcome {
    let source_key = record.key().to_string();
    tracing::info!(task = "resizing", image = %source_key);

    match derive_and_store(store, &source_key).await {
        Ok(receipt) => ThumbnailOutcome::Stored {
            key: receipt.key,
            etag: receipt.etag,
        },
        Err(error) => {
            tracing::error!(
                %source_key,
                error.code = %error.code,
                error.message = %error.message,
                "Failed to derive thumbnail; siblings continue"
            );
            ThumbnailOutcome::Failed { source_key, error }
        }
    }
}

async fn derive_and_store(
    store: &dyn ObjectStore,
    source_key: &str,
) -> Result<PutReceipt, ErrorBody> {
    let dest_key = keys::thumbnail_key(source_key).map_err(|e| ErrorBody::from(&e))?;

    let original = store.get(source_key).await.map_err(|e| ErrorBody::from(&e))?;

    let thumbnail = render_thumbnail(&original).map_err(|e| ErrorBody::from(&e))?;
    tracing::debug!(s3_key = %dest_key, bytes = thumbnail.len(), "Storing thumbnail");

    let content_type = mime_guess::from_path(&dest_key)
        .first_raw()
        .map(|s| s.to_string());
    store
        .put(&dest_key, thumbnail, content_type)
        .await
        .map_err(|e| ErrorBody::from(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fakes::{MemoryStore, ScriptedTrending};
    use crate::fetcher;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([120, 40, 200]),
        ));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    fn batch_for(keys: &[&str]) -> NotificationBatch {
        serde_json::from_value(serde_json::json!({
            "Records": keys
                .iter()
                .map(|k| serde_json::json!({ "s3": { "object": { "key": k } } }))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn render_scales_to_fixed_width() {
        let source = encoded_image(10, 5, ImageFormat::Png);

        let thumb = render_thumbnail(&source).unwrap();

        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
        assert_eq!(image::guess_format(&thumb).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn render_keeps_gif_format() {
        let source = encoded_image(4, 4, ImageFormat::Gif);

        let thumb = render_thumbnail(&source).unwrap();

        assert_eq!(image::guess_format(&thumb).unwrap(), ImageFormat::Gif);
        assert_eq!(
            image::load_from_memory(&thumb).unwrap().dimensions(),
            (100, 100)
        );
    }

    #[test]
    fn render_is_deterministic() {
        let source = encoded_image(10, 5, ImageFormat::Png);
        assert_eq!(
            render_thumbnail(&source).unwrap(),
            render_thumbnail(&source).unwrap()
        );
    }

    #[test]
    fn scaled_height_follows_aspect_ratio() {
        assert_eq!(scaled_height(10, 5).unwrap(), 50);
        assert_eq!(scaled_height(50, 100).unwrap(), 200);
        // Very wide sources floor at 1 instead of a zero-height thumbnail.
        assert_eq!(scaled_height(1000, 1).unwrap(), 1);
    }

    #[test]
    fn scaled_height_rejects_overflow_instead_of_truncating() {
        // 1 x 50M scales to 5e9, past u32::MAX; must error, not wrap.
        assert!(matches!(
            scaled_height(1, 50_000_000),
            Err(ThumbnailError::HeightOverflow {
                width: 1,
                height: 50_000_000
            })
        ));
        assert!(matches!(scaled_height(0, 10), Err(ThumbnailError::EmptyImage)));
    }

    #[test]
    fn render_rejects_garbage_bytes() {
        assert!(matches!(
            render_thumbnail(b"definitely not an image"),
            Err(ThumbnailError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn derives_thumbnails_for_each_record() {
        let store = MemoryStore::default();
        store.insert("original/a.gif", encoded_image(10, 5, ImageFormat::Png));
        store.insert("original/b.gif", encoded_image(8, 8, ImageFormat::Png));

        let outcomes = process(&store, batch_for(&["original/a.gif", "original/b.gif"]), 8).await;

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], ThumbnailOutcome::Stored { .. }));
        let thumb = store.object("thumbnail/a.gif").unwrap();
        assert_eq!(
            image::load_from_memory(&thumb).unwrap().dimensions(),
            (100, 50)
        );
        assert!(store.object("thumbnail/b.gif").is_some());
    }

    #[tokio::test]
    async fn missing_object_fails_only_its_slot() {
        let store = MemoryStore::default();
        store.insert("original/here.gif", encoded_image(10, 10, ImageFormat::Png));

        let outcomes = process(
            &store,
            batch_for(&["original/gone.gif", "original/here.gif"]),
            8,
        )
        .await;

        match &outcomes[0] {
            ThumbnailOutcome::Failed { source_key, error } => {
                assert_eq!(source_key, "original/gone.gif");
                assert_eq!(error.code, "object_not_found");
            }
            other => panic!("expected failed slot, got {other:?}"),
        }
        assert!(matches!(outcomes[1], ThumbnailOutcome::Stored { .. }));
        assert!(store.object("thumbnail/here.gif").is_some());
    }

    #[tokio::test]
    async fn foreign_key_is_rejected_without_touching_the_store() {
        let store = MemoryStore::default();
        store.insert("misc/file.gif", encoded_image(3, 3, ImageFormat::Png));

        let outcomes = process(&store, batch_for(&["misc/file.gif"]), 8).await;

        match &outcomes[0] {
            ThumbnailOutcome::Failed { error, .. } => {
                assert_eq!(error.code, "key_not_original");
            }
            other => panic!("expected failed slot, got {other:?}"),
        }
        assert_eq!(store.keys(), vec!["misc/file.gif".to_string()]);
    }

    #[tokio::test]
    async fn undecodable_object_fails_only_its_slot() {
        let store = MemoryStore::default();
        store.insert("original/junk.gif", b"not an image".to_vec());

        let outcomes = process(&store, batch_for(&["original/junk.gif"]), 8).await;

        match &outcomes[0] {
            ThumbnailOutcome::Failed { error, .. } => {
                assert_eq!(error.code, "image_decode_failed");
            }
            other => panic!("expected failed slot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reprocessing_an_unchanged_original_is_idempotent() {
        let store = MemoryStore::default();
        store.insert("original/a.gif", encoded_image(10, 5, ImageFormat::Gif));

        process(&store, batch_for(&["original/a.gif"]), 8).await;
        let first = store.object("thumbnail/a.gif").unwrap();

        process(&store, batch_for(&["original/a.gif"]), 8).await;
        let second = store.object("thumbnail/a.gif").unwrap();

        assert_eq!(first, second);
    }

    /// Full pipeline through shared storage: 2 gifs and 1 sticker trend, the
    /// fetcher archives the 2 gifs, and each archived original is
    /// thumbnailed at width 100.
    #[tokio::test]
    async fn trending_gifs_end_up_as_thumbnails() {
        let gif_a = encoded_image(20, 10, ImageFormat::Gif);
        let gif_b = encoded_image(10, 20, ImageFormat::Gif);
        let trending = ScriptedTrending {
            // The sticker was already filtered out of the URL list upstream.
            urls: vec!["http://x/a.gif".to_string(), "http://x/b.gif".to_string()],
            bodies: [
                ("http://x/a.gif".to_string(), gif_a),
                ("http://x/b.gif".to_string(), gif_b),
            ]
            .into_iter()
            .collect(),
            trending_error: false,
        };
        let store = MemoryStore::default();

        let report = fetcher::run(&trending, &store, 25, 8).await.unwrap();
        assert_eq!(report.input.len(), 2);

        // One notification per stored original, as the bucket would emit.
        let originals: Vec<String> = store.keys();
        let batch = batch_for(&originals.iter().map(String::as_str).collect::<Vec<_>>());
        let outcomes = process(&store, batch, 8).await;

        assert!(outcomes
            .iter()
            .all(|o| matches!(o, ThumbnailOutcome::Stored { .. })));
        let thumbs: Vec<String> = store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(keys::THUMBNAIL_PREFIX))
            .collect();
        assert_eq!(thumbs.len(), 2);
        for key in thumbs {
            let decoded = image::load_from_memory(&store.object(&key).unwrap()).unwrap();
            assert_eq!(decoded.width(), THUMBNAIL_WIDTH);
        }
    }
}
