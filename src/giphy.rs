use crate::domain::TrendingSource;
use crate::errors::TrendingError;
use crate::models::TrendingResponse;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

const TRENDING_PATH: &str = "/v1/gifs/trending";

/// Content rating requested from the trending endpoint. Fixed: this pipeline
/// only archives general-audience GIFs.
const RATING: &str = "g";

/// Giphy API client. Cheap to clone; the inner reqwest client is a handle.
#[derive(Debug, Clone)]
pub struct GiphyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GiphyClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        debug!("Creating new Giphy client");
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TrendingSource for GiphyClient {
    async fn trending_gif_urls(&self, limit: u32) -> Result<Vec<String>, TrendingError> {
        debug!(limit, "Requesting trending GIFs from Giphy");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, TRENDING_PATH))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("limit", &limit.to_string()),
                ("rating", RATING),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to reach Giphy trending API");
                TrendingError::Http(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Giphy trending API returned error");
            return Err(TrendingError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let trending: TrendingResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse Giphy trending response");
            TrendingError::Decode(e)
        })?;

        let urls = trending.gif_urls();
        debug!(gifs_found = urls.len(), "Giphy trending response parsed");
        Ok(urls)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, TrendingError> {
        debug!(%url, "Downloading GIF content");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TrendingError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TrendingError::DownloadFailed {
                url: url.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TrendingError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(bytes.to_vec())
    }
}
