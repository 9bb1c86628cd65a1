// SPDX-License-Identifier: AGPL-3.0
// Shopfront Core - Type definitions

use serde::{Deserialize, Serialize};

/// Identifier assigned to a product by the catalog API
pub type ProductId = u64;

/// Review score attached to a product
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rating {
    /// Average score, 0.0 to 5.0
    pub rate: f64,
    /// Number of reviews
    pub count: u32,
}

impl Default for Rating {
    fn default() -> Self {
        Self { rate: 0.0, count: 0 }
    }
}

/// A catalog product. Never mutated once decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub description: String,
    /// Image URL
    pub image: String,
    pub rating: Rating,
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Short form used in list rows, e.g. "Backpack ($109.95)"
    pub fn display_label(&self, currency_symbol: &str) -> String {
        format!("{} ({}{:.2})", self.title, currency_symbol, self.price)
    }

    /// Rating rendered as "4.1/5 (120 reviews)"
    pub fn rating_label(&self) -> String {
        format!("{:.1}/5 ({} reviews)", self.rating.rate, self.rating.count)
    }
}

/// Default catalog endpoint
pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com/products";

/// Application settings (frontend-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Endpoint returning the product catalog as a JSON array
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    /// Whole-request timeout for catalog and image fetches
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Keep downloaded images in memory, keyed by URL
    #[serde(default = "default_image_cache_enabled")]
    pub image_cache_enabled: bool,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_image_cache_enabled() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            image_cache_enabled: default_image_cache_enabled(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl AppSettings {
    /// Environment variable that overrides `catalog_url`
    pub const CATALOG_URL_ENV: &'static str = "SHOPFRONT_CATALOG_URL";

    /// Apply overrides from the process environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(Self::CATALOG_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::info!("Catalog URL overridden from environment: {}", url);
                self.catalog_url = url;
            }
        }
        self
    }

    /// Build the HTTP client shared by the catalog and image fetchers
    pub fn http_client(&self) -> Result<reqwest::Client, AppError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(self.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response format: {0}")]
    Decode(String),

    #[error("No data received")]
    EmptyResponse,

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}
