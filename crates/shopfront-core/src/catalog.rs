// SPDX-License-Identifier: AGPL-3.0
// Shopfront Core - Product catalog retrieval
//
// The catalog is a JSON array defined by a third-party API. Records are
// decoded one at a time so a single bad entry does not hide the rest.

use crate::types::{AppError, Product};
use reqwest::{Client, Url};
use std::future::Future;

/// Source of the product list
pub trait ProductCatalogFetcher: Send + Sync {
    /// Fetch the full catalog once. No retry.
    fn fetch(&self) -> impl Future<Output = Result<Vec<Product>, AppError>> + Send;
}

/// Parse and validate a catalog or image endpoint
pub fn parse_endpoint(url: &str) -> Result<Url, AppError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| AppError::InvalidEndpoint(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AppError::InvalidEndpoint(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}

/// Decode a catalog response body.
///
/// Unknown fields are ignored and malformed records are skipped.
pub fn decode_catalog(body: &[u8]) -> Result<Vec<Product>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Decode(format!("Failed to parse catalog: {}", e)))?;

    let serde_json::Value::Array(records) = value else {
        return Err(AppError::Decode(
            "Expected a JSON array of products".to_string(),
        ));
    };

    let total = records.len();
    let products: Vec<Product> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            serde_json::from_value::<Product>(record)
                .map_err(|e| {
                    tracing::warn!("Skipping malformed product at index {}: {}", position, e);
                })
                .ok()
        })
        .collect();

    if products.len() < total {
        tracing::warn!("Decoded {} of {} catalog records", products.len(), total);
    }

    Ok(products)
}

/// Catalog fetcher backed by an HTTP GET.
///
/// The endpoint is validated on each fetch, so a bad configured URL surfaces
/// as an `InvalidEndpoint` fetch failure instead of a startup error.
pub struct HttpCatalogFetcher {
    client: Client,
    endpoint: String,
}

impl HttpCatalogFetcher {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl ProductCatalogFetcher for HttpCatalogFetcher {
    async fn fetch(&self) -> Result<Vec<Product>, AppError> {
        let url = parse_endpoint(&self.endpoint)?;
        tracing::info!("Fetching catalog from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Catalog request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "Catalog endpoint returned status {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read catalog body: {}", e)))?;

        let products = decode_catalog(&body)?;
        tracing::info!("Fetched {} products", products.len());
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Fits 15 inch laptops",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": {"rate": 3.9, "count": 120}
        },
        {
            "id": 2,
            "title": "Slim Fit T-Shirt",
            "price": 22.3,
            "description": "Casual wear",
            "image": "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg",
            "rating": {"rate": 4.1, "count": 259},
            "discount": {"percent": 10}
        }
    ]"#;

    #[test]
    fn test_decode_sample() {
        let products = decode_catalog(SAMPLE.as_bytes()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[0].category, "men's clothing");
        assert_eq!(products[0].rating.count, 120);
        assert_eq!(products[1].title, "Slim Fit T-Shirt");
        assert_eq!(products[1].category, "");
    }

    #[test]
    fn test_decode_skips_malformed_records() {
        let body = r#"[
            {"id": 1, "title": "Ok", "price": 1.0, "description": "", "image": "", "rating": {"rate": 1.0, "count": 1}},
            {"id": "two", "title": "Bad id"},
            {"id": 3, "title": "Also ok", "price": 3.5, "description": "", "image": "", "rating": {"rate": 2.0, "count": 0}}
        ]"#;
        let products = decode_catalog(body.as_bytes()).unwrap();
        assert_eq!(
            products.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(matches!(decode_catalog(b""), Err(AppError::EmptyResponse)));
        assert!(matches!(decode_catalog(b"  \n"), Err(AppError::EmptyResponse)));
    }

    #[test]
    fn test_decode_wrong_shape() {
        assert!(matches!(
            decode_catalog(br#"{"products": []}"#),
            Err(AppError::Decode(_))
        ));
        assert!(matches!(decode_catalog(b"<html>"), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_catalog(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("https://fakestoreapi.com/products").is_ok());
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(AppError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            parse_endpoint("ftp://example.com/products"),
            Err(AppError::InvalidEndpoint(_))
        ));
    }
}
