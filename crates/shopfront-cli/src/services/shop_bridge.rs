// SPDX-License-Identifier: AGPL-3.0
// Shopfront CLI - Shop Bridge
//
// Runs catalog and image fetches on the tokio runtime and hands the results
// back to the UI loop. Each fetch runs in its own task, so completions may
// arrive in any order.

use async_channel::{Receiver, Sender};
use bytes::Bytes;
use shopfront_core::{ImageFetcher, Product, ProductCatalogFetcher, ProductId};
use std::sync::Arc;

/// Commands that can be sent to the bridge
#[derive(Debug)]
pub enum BridgeCommand {
    FetchCatalog,
    FetchImage { product_id: ProductId, url: String },
}

/// Fetch completions delivered to the UI loop
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    CatalogLoaded(Vec<Product>),
    /// Human readable failure message
    CatalogFailed(String),
    ImageLoaded {
        product_id: ProductId,
        url: String,
        bytes: Bytes,
    },
    ImageFailed { product_id: ProductId, url: String },
}

/// Bridge between the UI loop and the async fetchers
pub struct ShopBridge {
    command_tx: Sender<BridgeCommand>,
    event_rx: Receiver<BridgeEvent>,
}

impl ShopBridge {
    /// Must be called from within a tokio runtime.
    pub fn new<C, I>(catalog: C, images: I) -> Self
    where
        C: ProductCatalogFetcher + 'static,
        I: ImageFetcher + 'static,
    {
        let (command_tx, command_rx) = async_channel::bounded::<BridgeCommand>(32);
        let (event_tx, event_rx) = async_channel::bounded::<BridgeEvent>(64);

        tokio::spawn(Self::run_bridge(
            Arc::new(catalog),
            Arc::new(images),
            command_rx,
            event_tx,
        ));

        Self {
            command_tx,
            event_rx,
        }
    }

    async fn run_bridge<C, I>(
        catalog: Arc<C>,
        images: Arc<I>,
        command_rx: Receiver<BridgeCommand>,
        event_tx: Sender<BridgeEvent>,
    ) where
        C: ProductCatalogFetcher + 'static,
        I: ImageFetcher + 'static,
    {
        while let Ok(cmd) = command_rx.recv().await {
            let tx = event_tx.clone();
            match cmd {
                BridgeCommand::FetchCatalog => {
                    let catalog = catalog.clone();
                    tokio::spawn(async move {
                        let event = match catalog.fetch().await {
                            Ok(products) => BridgeEvent::CatalogLoaded(products),
                            Err(e) => {
                                tracing::error!("Catalog fetch failed: {}", e);
                                BridgeEvent::CatalogFailed(e.to_string())
                            }
                        };
                        let _ = tx.send(event).await;
                    });
                }
                BridgeCommand::FetchImage { product_id, url } => {
                    let images = images.clone();
                    tokio::spawn(async move {
                        let event = match images.fetch(&url).await {
                            Ok(bytes) => BridgeEvent::ImageLoaded {
                                product_id,
                                url,
                                bytes,
                            },
                            Err(e) => {
                                tracing::debug!("Image fetch for {} failed: {}", product_id, e);
                                BridgeEvent::ImageFailed { product_id, url }
                            }
                        };
                        let _ = tx.send(event).await;
                    });
                }
            }
        }
        tracing::debug!("Bridge command channel closed");
    }

    /// Request the product catalog
    pub async fn fetch_catalog(&self) {
        let _ = self.command_tx.send(BridgeCommand::FetchCatalog).await;
    }

    /// Request a product image
    pub async fn fetch_image(&self, product_id: ProductId, url: String) {
        let _ = self
            .command_tx
            .send(BridgeCommand::FetchImage { product_id, url })
            .await;
    }

    /// Get event receiver for subscribing to fetch completions
    pub fn event_receiver(&self) -> Receiver<BridgeEvent> {
        self.event_rx.clone()
    }
}
