// SPDX-License-Identifier: AGPL-3.0
// Shopfront CLI - Services

pub mod shop_bridge;

pub use shop_bridge::{BridgeEvent, ShopBridge};
