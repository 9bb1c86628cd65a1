// SPDX-License-Identifier: AGPL-3.0
// Shopfront Core - Favorites and cart state
//
// A product is favorited exactly when it is in the cart. Every command goes
// through `set_active`, which moves both flags together.

use crate::types::{Product, ProductId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::broadcast;

/// Capacity of the change notification channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Favorite and cart flags for one product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipState {
    pub is_favorite: bool,
    pub in_cart: bool,
}

impl MembershipState {
    pub const NEUTRAL: Self = Self {
        is_favorite: false,
        in_cart: false,
    };

    pub const ACTIVE: Self = Self {
        is_favorite: true,
        in_cart: true,
    };

    pub fn is_active(&self) -> bool {
        self.is_favorite && self.in_cart
    }
}

/// Change notifications emitted after a command alters state
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    FavoriteChanged {
        product_id: ProductId,
        state: MembershipState,
    },
    CatalogReplaced {
        product_count: usize,
    },
    CheckedOut {
        item_count: usize,
    },
}

/// Immutable view of the cart at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub items: Vec<Product>,
    pub count: usize,
    pub total: f64,
}

/// One purchased product in a mock order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub title: String,
    pub price: f64,
}

/// Result of a mock checkout
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub item_count: usize,
    pub total: f64,
    pub placed_at: DateTime<Utc>,
}

/// Single source of truth for favorites and cart membership
pub struct CartFavoriteStore {
    /// Displayed products, in fetch order
    products: Vec<Product>,
    /// Product id -> position in `products`
    index: HashMap<ProductId, usize>,
    memberships: HashMap<ProductId, MembershipState>,
    /// Cart ids in the order they were first added
    cart: Vec<ProductId>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for CartFavoriteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartFavoriteStore {
    /// Create an empty store with no catalog loaded
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            products: Vec::new(),
            index: HashMap::new(),
            memberships: HashMap::new(),
            cart: Vec::new(),
            events,
        }
    }

    /// Create a store that already displays `products`
    pub fn with_catalog(products: Vec<Product>) -> Self {
        let mut store = Self::new();
        store.set_catalog(products);
        store
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Replace the displayed catalog.
    ///
    /// Products missing from the new list lose their membership; the rest keep
    /// their state and cart position. Duplicate ids keep the first occurrence.
    pub fn set_catalog(&mut self, products: Vec<Product>) {
        self.products.clear();
        self.index.clear();

        for product in products {
            if self.index.contains_key(&product.id) {
                tracing::warn!("Duplicate product id {} in catalog, skipping", product.id);
                continue;
            }
            self.index.insert(product.id, self.products.len());
            self.products.push(product);
        }

        let index = &self.index;
        self.memberships.retain(|id, _| index.contains_key(id));
        self.cart.retain(|id| index.contains_key(id));

        tracing::info!("Catalog replaced with {} products", self.products.len());
        self.emit(StoreEvent::CatalogReplaced {
            product_count: self.products.len(),
        });
    }

    /// Displayed products, in fetch order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a displayed product
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).map(|&pos| &self.products[pos])
    }

    /// Flip the favorite flag; the cart follows it
    pub fn toggle_favorite(&mut self, id: ProductId) {
        let active = self.membership(id).is_favorite;
        self.set_active(id, !active);
    }

    /// Favorite the product and put it in the cart. Repeating this is a no-op.
    pub fn add_to_cart_and_favorite(&mut self, id: ProductId) {
        self.set_active(id, true);
    }

    /// Take the product out of the cart and unfavorite it
    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.set_active(id, false);
    }

    /// Products in the cart, in the order they were first added
    pub fn cart_contents(&self) -> Vec<&Product> {
        self.cart.iter().filter_map(|id| self.product(*id)).collect()
    }

    /// Number of products in the cart
    pub fn cart_count(&self) -> usize {
        self.cart.len()
    }

    /// Sum of cart prices
    pub fn cart_total(&self) -> f64 {
        self.cart_contents().iter().map(|p| p.price).sum()
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.membership(id).is_favorite
    }

    pub fn is_in_cart(&self, id: ProductId) -> bool {
        self.membership(id).in_cart
    }

    /// Membership flags for `id`; neutral for unknown ids
    pub fn membership(&self, id: ProductId) -> MembershipState {
        self.memberships.get(&id).copied().unwrap_or_default()
    }

    /// Copy of the current cart
    pub fn snapshot(&self) -> CartSnapshot {
        let items: Vec<Product> = self.cart_contents().into_iter().cloned().collect();
        CartSnapshot {
            count: items.len(),
            items,
            total: self.cart_total(),
        }
    }

    /// Mock checkout: summarize the cart, then return every product to neutral.
    /// Returns `None` for an empty cart.
    pub fn checkout(&mut self) -> Option<OrderSummary> {
        if self.cart.is_empty() {
            return None;
        }

        let lines: Vec<OrderLine> = self
            .cart_contents()
            .into_iter()
            .map(|p| OrderLine {
                product_id: p.id,
                title: p.title.clone(),
                price: p.price,
            })
            .collect();
        let total = lines.iter().map(|l| l.price).sum();
        let item_count = lines.len();

        self.cart.clear();
        self.memberships.clear();

        tracing::info!("Checked out {} items, total {:.2}", item_count, total);
        self.emit(StoreEvent::CheckedOut { item_count });

        Some(OrderSummary {
            lines,
            item_count,
            total,
            placed_at: Utc::now(),
        })
    }

    /// The only place membership changes: both flags move together.
    fn set_active(&mut self, id: ProductId, active: bool) {
        if !self.index.contains_key(&id) {
            tracing::warn!("Ignoring command for product {} not in catalog", id);
            return;
        }

        let current = self.membership(id);
        if current.is_active() == active {
            return;
        }

        let state = if active {
            self.cart.push(id);
            MembershipState::ACTIVE
        } else {
            self.cart.retain(|&other| other != id);
            MembershipState::NEUTRAL
        };

        if active {
            self.memberships.insert(id, state);
        } else {
            self.memberships.remove(&id);
        }

        tracing::debug!(product_id = id, active, "Membership changed");
        self.emit(StoreEvent::FavoriteChanged {
            product_id: id,
            state,
        });
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;

    fn product(id: ProductId, price: f64) -> Product {
        Product {
            id,
            title: format!("Product {}", id),
            price,
            description: String::new(),
            image: format!("https://example.com/{}.jpg", id),
            rating: Rating::default(),
            category: String::new(),
        }
    }

    fn store() -> CartFavoriteStore {
        CartFavoriteStore::with_catalog((1..=10).map(|id| product(id, id as f64)).collect())
    }

    fn cart_ids(store: &CartFavoriteStore) -> Vec<ProductId> {
        store.cart_contents().iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut store = store();

        store.toggle_favorite(5);
        assert_eq!(store.cart_count(), 1);
        assert_eq!(cart_ids(&store), vec![5]);
        assert!(store.is_favorite(5));
        assert!(store.is_in_cart(5));

        store.toggle_favorite(5);
        assert_eq!(store.cart_count(), 0);
        assert!(!store.is_favorite(5));
        assert!(!store.is_in_cart(5));
    }

    #[test]
    fn test_add_keeps_insertion_order_without_duplicates() {
        let mut store = store();

        store.add_to_cart_and_favorite(3);
        store.add_to_cart_and_favorite(7);
        store.add_to_cart_and_favorite(3);

        assert_eq!(cart_ids(&store), vec![3, 7]);
        assert_eq!(store.cart_count(), 2);
    }

    #[test]
    fn test_remove_clears_both_flags() {
        let mut store = store();
        store.add_to_cart_and_favorite(2);
        store.add_to_cart_and_favorite(4);

        store.remove_from_cart(2);

        assert!(!store.is_favorite(2));
        assert!(!store.is_in_cart(2));
        assert_eq!(cart_ids(&store), vec![4]);
    }

    #[test]
    fn test_remove_absent_product_is_noop() {
        let mut store = store();
        store.remove_from_cart(6);
        assert_eq!(store.membership(6), MembershipState::NEUTRAL);
        assert_eq!(store.cart_count(), 0);
    }

    #[test]
    fn test_readd_after_remove_moves_to_end() {
        let mut store = store();
        store.add_to_cart_and_favorite(1);
        store.add_to_cart_and_favorite(2);
        store.toggle_favorite(1);
        store.toggle_favorite(1);
        assert_eq!(cart_ids(&store), vec![2, 1]);
    }

    #[test]
    fn test_unknown_product_is_ignored() {
        let mut store = store();
        store.toggle_favorite(99);
        store.add_to_cart_and_favorite(99);
        assert!(!store.is_favorite(99));
        assert!(!store.is_in_cart(99));
        assert_eq!(store.cart_count(), 0);
        assert_eq!(store.cart_contents().len(), 0);
    }

    #[test]
    fn test_cart_total() {
        let mut store = store();
        store.add_to_cart_and_favorite(2);
        store.add_to_cart_and_favorite(3);
        assert!((store.cart_total() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_catalog_replacement_prunes_missing_products() {
        let mut store = store();
        store.add_to_cart_and_favorite(1);
        store.add_to_cart_and_favorite(8);
        store.add_to_cart_and_favorite(2);

        store.set_catalog(vec![product(2, 2.0), product(1, 1.0)]);

        assert_eq!(cart_ids(&store), vec![1, 2]);
        assert!(!store.is_favorite(8));
        assert_eq!(store.products().len(), 2);
    }

    #[test]
    fn test_duplicate_catalog_ids_keep_first() {
        let mut first = product(1, 1.0);
        first.title = "First".to_string();
        let store = CartFavoriteStore::with_catalog(vec![first, product(1, 9.0)]);
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.product(1).map(|p| p.title.as_str()), Some("First"));
    }

    #[test]
    fn test_checkout_summarizes_and_resets() {
        let mut store = store();
        store.add_to_cart_and_favorite(4);
        store.add_to_cart_and_favorite(1);

        let order = store.checkout().unwrap();

        assert_eq!(order.item_count, 2);
        assert_eq!(
            order.lines.iter().map(|l| l.product_id).collect::<Vec<_>>(),
            vec![4, 1]
        );
        assert!((order.total - 5.0).abs() < f64::EPSILON);
        assert_eq!(store.cart_count(), 0);
        assert!(!store.is_favorite(4));
        assert!(store.checkout().is_none());
    }

    #[test]
    fn test_snapshot_matches_cart() {
        let mut store = store();
        store.add_to_cart_and_favorite(9);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.items[0].id, 9);
        assert!((snapshot.total - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_events_emitted_only_on_change() {
        let mut store = store();
        let mut rx = store.subscribe();

        store.add_to_cart_and_favorite(3);
        store.add_to_cart_and_favorite(3);
        store.remove_from_cart(3);
        store.toggle_favorite(42);

        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::FavoriteChanged {
                product_id: 3,
                state: MembershipState::ACTIVE,
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::FavoriteChanged {
                product_id: 3,
                state: MembershipState::NEUTRAL,
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_checkout_and_catalog_events() {
        let mut store = store();
        let mut rx = store.subscribe();

        store.add_to_cart_and_favorite(1);
        store.checkout();
        store.set_catalog(vec![product(1, 1.0)]);

        assert!(matches!(rx.try_recv(), Ok(StoreEvent::FavoriteChanged { .. })));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::CheckedOut { item_count: 1 });
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::CatalogReplaced { product_count: 1 }
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Command {
            Toggle(ProductId),
            Add(ProductId),
            Remove(ProductId),
        }

        fn command() -> impl Strategy<Value = Command> {
            // Ids 11 and 12 are outside the catalog
            prop_oneof![
                (1u64..=12).prop_map(Command::Toggle),
                (1u64..=12).prop_map(Command::Add),
                (1u64..=12).prop_map(Command::Remove),
            ]
        }

        fn apply(store: &mut CartFavoriteStore, cmd: &Command) {
            match *cmd {
                Command::Toggle(id) => store.toggle_favorite(id),
                Command::Add(id) => store.add_to_cart_and_favorite(id),
                Command::Remove(id) => store.remove_from_cart(id),
            }
        }

        proptest! {
            /// Property: favorite and cart flags always agree.
            #[test]
            fn flags_stay_in_lockstep(cmds in prop::collection::vec(command(), 0..64)) {
                let mut store = store();
                for cmd in &cmds {
                    apply(&mut store, cmd);
                    for id in 1..=12 {
                        prop_assert_eq!(store.is_favorite(id), store.is_in_cart(id));
                    }
                }
            }

            /// Property: count matches contents and contents hold no duplicates.
            #[test]
            fn count_matches_unique_contents(cmds in prop::collection::vec(command(), 0..64)) {
                let mut store = store();
                for cmd in &cmds {
                    apply(&mut store, cmd);
                }
                let mut ids = cart_ids(&store);
                prop_assert_eq!(store.cart_count(), ids.len());
                prop_assert_eq!(
                    store.cart_count(),
                    (1..=12).filter(|&id| store.is_in_cart(id)).count()
                );
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), store.cart_count());
            }

            /// Property: toggling twice restores the previous state.
            #[test]
            fn double_toggle_restores_state(
                cmds in prop::collection::vec(command(), 0..32),
                id in 1u64..=12
            ) {
                let mut store = store();
                for cmd in &cmds {
                    apply(&mut store, cmd);
                }
                let before = store.membership(id);
                let count_before = store.cart_count();
                store.toggle_favorite(id);
                store.toggle_favorite(id);
                prop_assert_eq!(store.membership(id), before);
                prop_assert_eq!(store.cart_count(), count_before);
            }

            /// Property: adding twice is the same as adding once.
            #[test]
            fn add_is_idempotent(
                cmds in prop::collection::vec(command(), 0..32),
                id in 1u64..=10
            ) {
                let mut store = store();
                for cmd in &cmds {
                    apply(&mut store, cmd);
                }
                store.add_to_cart_and_favorite(id);
                let once = cart_ids(&store);
                store.add_to_cart_and_favorite(id);
                prop_assert_eq!(cart_ids(&store), once);
            }

            /// Property: removal leaves the product neutral and out of the cart.
            #[test]
            fn remove_leaves_product_neutral(
                cmds in prop::collection::vec(command(), 0..32),
                id in 1u64..=12
            ) {
                let mut store = store();
                for cmd in &cmds {
                    apply(&mut store, cmd);
                }
                store.remove_from_cart(id);
                prop_assert!(!store.is_favorite(id));
                prop_assert!(!store.is_in_cart(id));
                prop_assert!(!cart_ids(&store).contains(&id));
            }
        }
    }
}
