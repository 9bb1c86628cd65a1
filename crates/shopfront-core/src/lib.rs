// SPDX-License-Identifier: AGPL-3.0
// Shopfront Core - Shared logic for all frontends
//
// This crate provides:
// - Product, AppSettings and AppError types
// - CartFavoriteStore, the favorites/cart state
// - HttpCatalogFetcher and HttpImageFetcher for the remote catalog
// - SettingsStore for persistent settings
//
// Frontend-specific code lives in separate crates.

pub mod catalog;
pub mod images;
pub mod settings;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use catalog::{decode_catalog, HttpCatalogFetcher, ProductCatalogFetcher};
pub use images::{HttpImageFetcher, ImageFetcher};
pub use settings::SettingsStore;
pub use store::{
    CartFavoriteStore, CartSnapshot, MembershipState, OrderLine, OrderSummary, StoreEvent,
};
pub use types::{AppError, AppSettings, Product, ProductId, Rating};
