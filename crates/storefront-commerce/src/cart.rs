//! Cart and cart item types.
//!
//! One canonical shape serves both lifecycles: a guest cart mutated
//! locally and an account cart mirrored from the remote store. The
//! mutations here are the pure guest-mode operations; account carts
//! are replaced wholesale after each remote write (see the cart store
//! in `storefront-app`).

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::CartItemId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A line in the cart.
///
/// Item identity is distinct from product identity: merging by product
/// happens on add, after which the line is addressed by its own id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique cart item identifier.
    pub id: CartItemId,
    /// The product being purchased.
    pub product: Product,
    /// Quantity, always >= 1.
    pub quantity: u32,
}

impl CartItem {
    /// Create a new cart item.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self {
            id: CartItemId::generate(),
            product,
            quantity,
        }
    }

    /// Line total (unit price x quantity), None on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.product.price.try_multiply(self.quantity as i64)
    }
}

/// A shopping cart.
///
/// `subtotal`/`shipping`/`total` are derived by the remote store and
/// present only for account carts; guest carts leave them `None` and
/// callers recompute the subtotal locally via [`Cart::local_subtotal`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    /// Items in the cart, in insertion order.
    pub items: Vec<CartItem>,
    /// Server-derived subtotal (account carts only).
    pub subtotal: Option<Money>,
    /// Server-derived shipping cost (account carts only).
    pub shipping: Option<Money>,
    /// Server-derived grand total (account carts only).
    pub total: Option<Money>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Get an item by its id.
    pub fn get_item(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Locally computed subtotal: sum of price x quantity.
    ///
    /// This is the presentation-side figure for guest carts, where no
    /// server-derived totals exist.
    pub fn local_subtotal(&self) -> Result<Money, CommerceError> {
        let currency = self
            .items
            .first()
            .map(|i| i.product.price.currency)
            .unwrap_or(Currency::USD);
        let mut total = Money::zero(currency);
        for item in &self.items {
            let line = item.line_total().ok_or(CommerceError::Overflow)?;
            total = total.try_add(&line).ok_or_else(|| CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: line.currency.code().to_string(),
            })?;
        }
        Ok(total)
    }

    /// Add a product (guest mode).
    ///
    /// If a line for the same product id exists, its quantity is
    /// incremented by `quantity`; otherwise a new line is appended.
    /// Returns the id of the affected line.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<CartItemId, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity as i64));
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            return Ok(existing.id.clone());
        }

        let item = CartItem::new(product, quantity);
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Set a line's quantity (guest mode), addressed by item id.
    ///
    /// Quantities below 1 are rejected and leave the cart unchanged;
    /// the decrement control is expected to no-op at 1 rather than
    /// pass 0 through.
    pub fn update_quantity(
        &mut self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity as i64));
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line (guest mode). Removing an unknown id is a no-op.
    pub fn remove(&mut self, item_id: &CartItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        self.items.len() < len_before
    }

    /// Clear all items and any stale derived totals.
    pub fn clear(&mut self) {
        self.items.clear();
        self.subtotal = None;
        self.shipping = None;
        self.total = None;
    }
}
