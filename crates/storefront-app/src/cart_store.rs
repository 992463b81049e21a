//! The cart store.
//!
//! One store serves both guest and account carts behind a single
//! [`Cart`] shape. Guest mode mutates locally; account mode sends the
//! mutation and then reloads the whole cart, so server-computed totals
//! are never derived client-side.

use std::sync::Arc;

use storefront_api::{ApiError, CartApi};
use storefront_commerce::cart::Cart;
use storefront_commerce::catalog::Product;
use storefront_commerce::error::CommerceError;
use storefront_commerce::ids::CartItemId;
use storefront_commerce::money::Money;
use thiserror::Error;

use crate::session::Session;

/// Cart store errors.
#[derive(Error, Debug)]
pub enum CartError {
    /// A domain rule rejected the mutation; the cart is unchanged.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// The Cart API call failed; the last good cart is kept.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Which backing the cart currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMode {
    /// Local-only cart for anonymous visitors.
    Guest,
    /// Server-backed cart for signed-in users.
    Account,
}

/// Holds the current cart and its UI-facing flags.
pub struct CartStore {
    api: Arc<dyn CartApi>,
    cart: Cart,
    mode: CartMode,
    loading: bool,
    is_open: bool,
    last_added: Option<Product>,
    // Bumped on every session transition; reloads started under an
    // older epoch discard their result instead of clobbering the new
    // session's cart.
    epoch: u64,
}

impl CartStore {
    /// Create an empty guest-mode store.
    pub fn new(api: Arc<dyn CartApi>) -> Self {
        Self {
            api,
            cart: Cart::new(),
            mode: CartMode::Guest,
            loading: false,
            is_open: false,
            last_added: None,
            epoch: 0,
        }
    }

    /// The current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The current backing mode.
    pub fn mode(&self) -> CartMode {
        self.mode
    }

    /// Whether a reload is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the cart drawer is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Open the cart drawer.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Close the cart drawer.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// The most recently added product, for the confirmation popup.
    pub fn last_added(&self) -> Option<&Product> {
        self.last_added.as_ref()
    }

    /// Dismiss the added-to-cart confirmation.
    pub fn dismiss_last_added(&mut self) {
        self.last_added = None;
    }

    /// Align the store with a session change.
    ///
    /// Signing in switches to account mode and loads the server cart,
    /// replacing whatever the guest cart held. Signing out switches to
    /// guest mode with an empty cart, so the next visitor never sees
    /// the previous account's items.
    pub async fn sync_session(&mut self, session: &Session) -> Result<(), CartError> {
        match (self.mode, session.is_authenticated()) {
            (CartMode::Guest, true) => {
                self.mode = CartMode::Account;
                self.epoch += 1;
                self.cart = Cart::new();
                self.reload().await
            }
            (CartMode::Account, false) => {
                self.mode = CartMode::Guest;
                self.epoch += 1;
                self.cart = Cart::new();
                self.loading = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Fetch the server cart and replace local contents.
    ///
    /// Guest mode is a no-op. A reload that resolves after a session
    /// transition is discarded.
    pub async fn reload(&mut self) -> Result<(), CartError> {
        if self.mode != CartMode::Account {
            return Ok(());
        }
        let epoch = self.epoch;
        self.loading = true;
        let result = self.api.fetch_cart().await;
        if self.epoch != epoch {
            tracing::debug!("discarding cart reload from a previous session");
            return Ok(());
        }
        self.loading = false;
        match result {
            Ok(cart) => {
                self.cart = cart;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart reload failed");
                Err(CartError::Api(e))
            }
        }
    }

    /// Add a product to the cart.
    ///
    /// Guest mode merges by product; account mode posts the line and
    /// reloads. Either way the confirmation popup is armed, matching
    /// the optimistic add feedback users expect.
    pub async fn add_to_cart(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        self.last_added = Some(product.clone());
        match self.mode {
            CartMode::Guest => {
                self.cart.add(product, quantity)?;
                Ok(())
            }
            CartMode::Account => {
                let epoch = self.epoch;
                let result = self.api.add_item(&product.id, quantity).await;
                self.finish_mutation(epoch, result).await
            }
        }
    }

    /// Set a line's quantity.
    ///
    /// Quantities below 1 are rejected in both modes before any API
    /// call is made.
    pub async fn update_item(
        &mut self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::Commerce(CommerceError::InvalidQuantity(
                quantity as i64,
            )));
        }
        match self.mode {
            CartMode::Guest => {
                self.cart.update_quantity(item_id, quantity)?;
                Ok(())
            }
            CartMode::Account => {
                let epoch = self.epoch;
                let result = self.api.update_item(item_id, quantity).await;
                self.finish_mutation(epoch, result).await
            }
        }
    }

    /// Remove a line. Removing an unknown id is a no-op in guest mode.
    pub async fn remove_item(&mut self, item_id: &CartItemId) -> Result<(), CartError> {
        match self.mode {
            CartMode::Guest => {
                self.cart.remove(item_id);
                Ok(())
            }
            CartMode::Account => {
                let epoch = self.epoch;
                let result = self.api.remove_item(item_id).await;
                self.finish_mutation(epoch, result).await
            }
        }
    }

    /// Empty the cart. Idempotent; clearing an empty cart succeeds.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        match self.mode {
            CartMode::Guest => {
                self.cart.clear();
                Ok(())
            }
            CartMode::Account => {
                let epoch = self.epoch;
                let result = self.api.clear().await;
                self.finish_mutation(epoch, result).await
            }
        }
    }

    /// The subtotal to display: server-computed when available,
    /// locally summed otherwise (guest carts have no server totals).
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        match &self.cart.subtotal {
            Some(subtotal) => Ok(subtotal.clone()),
            None => self.cart.local_subtotal(),
        }
    }

    /// Finish an account-mode mutation: on success reload the whole
    /// cart, on failure keep the last good cart and surface the error.
    async fn finish_mutation(
        &mut self,
        epoch: u64,
        result: Result<(), ApiError>,
    ) -> Result<(), CartError> {
        if self.epoch != epoch {
            tracing::debug!("discarding cart mutation from a previous session");
            return Ok(());
        }
        match result {
            Ok(()) => self.reload().await,
            Err(e) => {
                tracing::warn!(error = %e, "cart mutation failed, keeping last good cart");
                Err(CartError::Api(e))
            }
        }
    }
}
