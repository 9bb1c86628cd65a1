// SPDX-License-Identifier: AGPL-3.0
// Shopfront Core - Product image retrieval

use crate::catalog::parse_endpoint;
use crate::types::AppError;
use bytes::Bytes;
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Source of product image bytes
pub trait ImageFetcher: Send + Sync {
    /// Fetch the image at `url` once. No retry.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, AppError>> + Send;
}

/// Image fetcher backed by HTTP GET, with an optional per-url cache
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
    cache: Option<Arc<Mutex<HashMap<String, Bytes>>>>,
}

impl HttpImageFetcher {
    pub fn new(client: Client, cache_enabled: bool) -> Self {
        Self {
            client,
            cache: cache_enabled.then(|| Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    /// Number of cached images
    pub async fn cached_count(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.lock().await.len(),
            None => 0,
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, AppError> {
        let url = parse_endpoint(url)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Image request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "Image {} returned status {}",
                url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read image body: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::EmptyResponse);
        }

        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AppError> {
        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.lock().await.get(url) {
                tracing::debug!("Image cache hit for {}", url);
                return Ok(bytes.clone());
            }
        }

        let bytes = self.download(url).await?;

        if let Some(cache) = &self.cache {
            cache.lock().await.insert(url.to_string(), bytes.clone());
        }

        Ok(bytes)
    }
}
