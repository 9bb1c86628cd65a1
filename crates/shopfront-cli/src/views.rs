// SPDX-License-Identifier: AGPL-3.0
// Shopfront CLI - Text views
//
// Pure rendering: every function turns state into lines of text.

use shopfront_core::{CartSnapshot, MembershipState, OrderSummary, Product};

/// Load state of a product image as shown in the detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// Not loaded yet, or the fetch failed
    Loading,
    Loaded { size: usize },
}

pub fn heart(state: MembershipState) -> &'static str {
    if state.is_favorite {
        "♥"
    } else {
        "♡"
    }
}

pub fn cart_badge(count: usize) -> String {
    match count {
        0 => "Cart: empty".to_string(),
        1 => "Cart: 1 item".to_string(),
        n => format!("Cart: {} items", n),
    }
}

pub fn product_row(product: &Product, state: MembershipState, currency: &str) -> String {
    format!(
        "{:>4}  {}  {}",
        product.id,
        heart(state),
        product.display_label(currency)
    )
}

pub fn product_list<'a>(
    products: impl IntoIterator<Item = (&'a Product, MembershipState)>,
    currency: &str,
) -> String {
    let rows: Vec<String> = products
        .into_iter()
        .map(|(product, state)| product_row(product, state, currency))
        .collect();

    if rows.is_empty() {
        "No products to show.".to_string()
    } else {
        rows.join("\n")
    }
}

pub fn product_detail(
    product: &Product,
    state: MembershipState,
    image: ImageStatus,
    currency: &str,
) -> String {
    let image_line = match image {
        ImageStatus::Loading => "[loading image...]".to_string(),
        ImageStatus::Loaded { size } => format!("[image: {} bytes]", size),
    };
    let cart_line = if state.in_cart {
        "In cart. Use `remove` to take it out."
    } else {
        "Not in cart. Use `add` to buy it."
    };

    let mut lines = vec![
        format!("{} {}", heart(state), product.title),
        format!("{}{:.2}  ·  {}", currency, product.price, product.rating_label()),
    ];
    if !product.category.is_empty() {
        lines.push(format!("Category: {}", product.category));
    }
    lines.push(image_line);
    lines.push(product.description.clone());
    lines.push(cart_line.to_string());
    lines.join("\n")
}

pub fn cart(snapshot: &CartSnapshot, currency: &str) -> String {
    if snapshot.items.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut lines: Vec<String> = snapshot
        .items
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:>3}. {}", i + 1, p.display_label(currency)))
        .collect();
    lines.push(format!(
        "{}, total {}{:.2}",
        cart_badge(snapshot.count),
        currency,
        snapshot.total
    ));
    lines.join("\n")
}

pub fn order(order: &OrderSummary, currency: &str) -> String {
    let mut lines = vec![format!(
        "Order placed at {}",
        order.placed_at.format("%Y-%m-%d %H:%M:%S UTC")
    )];
    lines.extend(
        order
            .lines
            .iter()
            .map(|l| format!("  {}  {}{:.2}", l.title, currency, l.price)),
    );
    lines.push(format!(
        "{} items, paid {}{:.2} (mock checkout)",
        order.item_count, currency, order.total
    ));
    lines.join("\n")
}

pub const HELP: &str = "\
Commands:
  list           show all products
  show <id>      show product details
  fav <id>       toggle favorite (favorites are kept in the cart)
  add <id>       add to cart and favorite
  remove <id>    remove from cart and unfavorite
  cart           show cart contents
  checkout       place a mock order
  reload         fetch the catalog again
  help           show this help
  quit           exit";
