use crate::domain::{ObjectStore, TrendingSource};
use crate::errors::{ErrorBody, TrendingError};
use crate::keys;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing;

/// Per-item result slot. One slot per retained trending URL, in upstream
/// order; a failed slot never aborts its siblings.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreOutcome {
    Stored {
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        etag: Option<String>,
    },
    Failed {
        error: ErrorBody,
    },
}

/// Response body of one Fetcher invocation.
#[derive(Serialize, Debug)]
pub struct FetchReport {
    pub message: String,
    pub input: Vec<StoreOutcome>,
}

/// Runs one Fetcher invocation: query trending, then download and store each
/// retained GIF. Per-item work runs concurrently, bounded by `fan_out_limit`;
/// `buffered` yields in input order, so slot N always belongs to URL N.
///
/// Only the trending call itself can fail this function; everything after it
/// is caught per item.
pub async fn run(
    trending: &dyn TrendingSource,
    store: &dyn ObjectStore,
    gif_limit: u32,
    fan_out_limit: usize,
) -> Result<FetchReport, TrendingError> {
    tracing::info!("Get GIFs from Giphy Trending API");
    let urls = trending.trending_gif_urls(gif_limit).await?;
    tracing::info!(gifs_found = urls.len(), "Trending GIFs selected");

    // Building the futures up front sidesteps a rustc limitation ("implementation
    // of `FnOnce` is not general enough") with borrowing closures in `map`;
    // async fn bodies stay lazy, so `buffered` still bounds the concurrency.
    let archives: Vec<_> = urls.iter().map(|url| archive(trending, store, url)).collect();
    let input: Vec<StoreOutcome> = stream::iter(archives)
        .buffered(fan_out_limit)
        .collect()
        .await;

    let stored = input
        .iter()
        .filter(|o| matches!(o, StoreOutcome::Stored { .. }))
        .count();
    tracing::info!(stored, total = input.len(), "Fetch invocation complete");

    Ok(FetchReport {
        message: "Gifs Saved".to_string(),
        input,
    })
}

async fn archive(
    trending: &dyn TrendingSource,
    store: &dyn ObjectStore,
    url: &str,
) -> StoreOutcome {
    match download_and_store(trending, store, url).await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(
                %url,
                error.code = %error.code,
                error.message = %error.message,
                "Failed to archive GIF; siblings continue"
            );
            StoreOutcome::Failed { error }
        }
    }
}

async fn download_and_store(
    trending: &dyn TrendingSource,
    store: &dyn ObjectStore,
    url: &str,
) -> Result<StoreOutcome, ErrorBody> {
    let data = trending.download(url).await.map_err(|e| ErrorBody::from(&e))?;

    let key = keys::original_key(url);
    tracing::debug!(s3_key = %key, bytes = data.len(), "Storing original");

    let content_type = mime_guess::from_path(&key).first_raw().map(|s| s.to_string());
    let receipt = store
        .put(&key, data, content_type)
        .await
        .map_err(|e| ErrorBody::from(&e))?;

    Ok(StoreOutcome::Stored {
        key: receipt.key,
        etag: receipt.etag,
    })
}
