// SPDX-License-Identifier: AGPL-3.0
// Shopfront CLI - Application
//
// The UI loop owns the CartFavoriteStore. User input and fetch completions
// are handled one at a time, so the store has a single writer.

use crate::services::{BridgeEvent, ShopBridge};
use crate::views::{self, ImageStatus};
use async_channel::Receiver;
use shopfront_core::{CartFavoriteStore, ProductId, StoreEvent};
use std::collections::HashMap;
use std::io::{self, Write};
use tokio::sync::broadcast;

/// A parsed user command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Show(ProductId),
    ToggleFavorite(ProductId),
    Add(ProductId),
    Remove(ProductId),
    Cart,
    Checkout,
    Reload,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_action(line: &str) -> Result<Option<Action>, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let argument = parts.next();
    if parts.next().is_some() {
        return Err(format!("Too many arguments for `{}`", command));
    }

    let id = |name: &str| -> Result<ProductId, String> {
        let raw = argument.ok_or_else(|| format!("Usage: {} <id>", name))?;
        raw.parse::<ProductId>()
            .map_err(|_| format!("Not a product id: {}", raw))
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "list" | "ls" => Action::List,
        "show" => Action::Show(id("show")?),
        "fav" | "favorite" => Action::ToggleFavorite(id("fav")?),
        "add" => Action::Add(id("add")?),
        "remove" | "rm" => Action::Remove(id("remove")?),
        "cart" => Action::Cart,
        "checkout" => Action::Checkout,
        "reload" => Action::Reload,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => return Err(format!("Unknown command `{}`. Type `help`.", other)),
    };
    Ok(Some(action))
}

/// Outcome of the most recent catalog request
#[derive(Debug, Clone, PartialEq, Eq)]
enum CatalogState {
    Loading,
    Ready,
    Failed(String),
}

/// Image status for a product, tied to the url it was requested from
#[derive(Debug, Clone, PartialEq)]
struct ImageEntry {
    url: String,
    status: ImageStatus,
}

pub struct App<W: Write> {
    store: CartFavoriteStore,
    store_events: broadcast::Receiver<StoreEvent>,
    bridge: ShopBridge,
    catalog_state: CatalogState,
    /// Set by the first successful load; a failed reload keeps the old catalog
    catalog_loaded: bool,
    images: HashMap<ProductId, ImageEntry>,
    currency: String,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(bridge: ShopBridge, currency: String, out: W) -> Self {
        let store = CartFavoriteStore::new();
        let store_events = store.subscribe();
        Self {
            store,
            store_events,
            bridge,
            catalog_state: CatalogState::Loading,
            catalog_loaded: false,
            images: HashMap::new(),
            currency,
            out,
        }
    }

    /// Run until the user quits or input ends
    pub async fn run(mut self, input: Receiver<String>) -> io::Result<()> {
        self.start().await?;
        let events = self.bridge.event_receiver();

        loop {
            tokio::select! {
                line = input.recv() => match line {
                    Ok(line) => {
                        if !self.handle_line(&line).await? {
                            break;
                        }
                    }
                    Err(_) => break, // Input closed
                },
                event = events.recv() => match event {
                    Ok(event) => self.handle_bridge_event(event)?,
                    Err(_) => break,
                },
            }
            self.prompt()?;
        }

        tracing::info!(
            "Shopfront session ended, {} items left in cart",
            self.store.cart_count()
        );
        Ok(())
    }

    /// Request the catalog, at startup and on `reload`
    pub async fn start(&mut self) -> io::Result<()> {
        if self.catalog_loaded {
            writeln!(self.out, "Reloading products...")?;
        } else {
            writeln!(self.out, "Loading products...")?;
        }
        self.catalog_state = CatalogState::Loading;
        self.bridge.fetch_catalog().await;
        Ok(())
    }

    /// Handle one line of input. Returns false when the user quits.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        match parse_action(line) {
            Ok(Some(action)) => self.handle_action(action).await,
            Ok(None) => Ok(true),
            Err(message) => {
                writeln!(self.out, "{}", message)?;
                Ok(true)
            }
        }
    }

    async fn handle_action(&mut self, action: Action) -> io::Result<bool> {
        match action {
            Action::Quit => return Ok(false),
            Action::Help => writeln!(self.out, "{}", views::HELP)?,
            Action::Reload => {
                self.start().await?;
            }
            _ if !self.catalog_loaded => {
                self.report_catalog_unavailable()?;
            }
            Action::List => self.render_list()?,
            Action::Show(id) => self.show_product(id).await?,
            Action::ToggleFavorite(id) => {
                if self.ensure_known(id)? {
                    self.store.toggle_favorite(id);
                }
            }
            Action::Add(id) => {
                if self.ensure_known(id)? {
                    if self.store.is_in_cart(id) {
                        writeln!(self.out, "Already in your cart.")?;
                    }
                    self.store.add_to_cart_and_favorite(id);
                }
            }
            Action::Remove(id) => {
                if self.ensure_known(id)? {
                    if !self.store.is_in_cart(id) {
                        writeln!(self.out, "Not in your cart.")?;
                    }
                    self.store.remove_from_cart(id);
                }
            }
            Action::Cart => {
                let snapshot = self.store.snapshot();
                writeln!(self.out, "{}", views::cart(&snapshot, &self.currency))?;
            }
            Action::Checkout => match self.store.checkout() {
                Some(order) => writeln!(self.out, "{}", views::order(&order, &self.currency))?,
                None => writeln!(self.out, "Your cart is empty, nothing to check out.")?,
            },
        }

        self.render_store_changes()?;
        Ok(true)
    }

    /// Apply a fetch completion
    pub fn handle_bridge_event(&mut self, event: BridgeEvent) -> io::Result<()> {
        match event {
            BridgeEvent::CatalogLoaded(products) => {
                self.store.set_catalog(products);
                self.prune_images();
                self.catalog_state = CatalogState::Ready;
                self.catalog_loaded = true;
                self.render_list()?;
            }
            BridgeEvent::CatalogFailed(message) => {
                if self.catalog_loaded {
                    writeln!(
                        self.out,
                        "Could not reload products: {}\nStill showing the previous list. Type `reload` to try again.",
                        message
                    )?;
                } else {
                    writeln!(
                        self.out,
                        "Could not load products: {}\nType `reload` to try again.",
                        message
                    )?;
                }
                self.catalog_state = CatalogState::Failed(message);
            }
            BridgeEvent::ImageLoaded {
                product_id,
                url,
                bytes,
            } => {
                let Some(entry) = self
                    .images
                    .get_mut(&product_id)
                    .filter(|entry| entry.url == url)
                else {
                    tracing::debug!("Dropping stale image for product {} ({})", product_id, url);
                    return self.render_store_changes();
                };
                entry.status = ImageStatus::Loaded { size: bytes.len() };
                if let Some(product) = self.store.product(product_id) {
                    writeln!(
                        self.out,
                        "Image for \"{}\" loaded ({} bytes)",
                        product.title,
                        bytes.len()
                    )?;
                }
            }
            // The placeholder stays up
            BridgeEvent::ImageFailed { product_id, url } => {
                tracing::debug!(
                    "Image for product {} unavailable ({}), keeping placeholder",
                    product_id,
                    url
                );
            }
        }

        self.render_store_changes()
    }

    async fn show_product(&mut self, id: ProductId) -> io::Result<()> {
        let Some(product) = self.store.product(id) else {
            return writeln!(self.out, "No product with id {}", id);
        };

        let image = match self.images.get(&id).map(|entry| entry.status) {
            Some(status) => status,
            None => {
                let url = product.image.clone();
                self.images.insert(
                    id,
                    ImageEntry {
                        url: url.clone(),
                        status: ImageStatus::Loading,
                    },
                );
                self.bridge.fetch_image(id, url).await;
                ImageStatus::Loading
            }
        };

        let Some(product) = self.store.product(id) else {
            return Ok(());
        };
        let state = self.store.membership(id);
        let text = views::product_detail(product, state, image, &self.currency);
        writeln!(self.out, "{}", text)
    }

    /// Forget images for products that left the catalog or changed image url
    fn prune_images(&mut self) {
        let store = &self.store;
        let before = self.images.len();
        self.images.retain(|id, entry| {
            store
                .product(*id)
                .is_some_and(|product| product.image == entry.url)
        });
        let dropped = before - self.images.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} stale image entries", dropped);
        }
    }

    fn ensure_known(&mut self, id: ProductId) -> io::Result<bool> {
        if self.store.product(id).is_some() {
            Ok(true)
        } else {
            writeln!(self.out, "No product with id {}", id)?;
            Ok(false)
        }
    }

    fn report_catalog_unavailable(&mut self) -> io::Result<()> {
        match &self.catalog_state {
            CatalogState::Failed(message) => writeln!(
                self.out,
                "Products are unavailable ({}). Type `reload` to try again.",
                message
            ),
            _ => writeln!(self.out, "Products are still loading..."),
        }
    }

    fn render_list(&mut self) -> io::Result<()> {
        let rows = self
            .store
            .products()
            .iter()
            .map(|p| (p, self.store.membership(p.id)));
        let text = views::product_list(rows, &self.currency);
        writeln!(self.out, "{}", text)?;
        writeln!(self.out, "{}", views::cart_badge(self.store.cart_count()))
    }

    /// Re-render whatever the store reported as changed
    fn render_store_changes(&mut self) -> io::Result<()> {
        let mut cart_changed = false;

        loop {
            match self.store_events.try_recv() {
                Ok(StoreEvent::FavoriteChanged { product_id, state }) => {
                    if let Some(product) = self.store.product(product_id) {
                        let verb = if state.is_active() {
                            "added to"
                        } else {
                            "removed from"
                        };
                        writeln!(
                            self.out,
                            "{} {} {} favorites and cart",
                            views::heart(state),
                            product.title,
                            verb
                        )?;
                    }
                    cart_changed = true;
                }
                Ok(StoreEvent::CheckedOut { .. }) => cart_changed = true,
                Ok(StoreEvent::CatalogReplaced { product_count }) => {
                    tracing::debug!("Catalog now shows {} products", product_count);
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} store notifications", skipped);
                    cart_changed = true;
                }
                Err(_) => break,
            }
        }

        if cart_changed {
            writeln!(self.out, "{}", views::cart_badge(self.store.cart_count()))?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }
}
