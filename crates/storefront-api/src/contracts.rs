//! Collaborator contracts.
//!
//! Each remote surface the core consumes is a separate trait so tests
//! (and any future transport) can stand in per collaborator. All
//! methods return the normalized [`ApiError`].

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_commerce::cart::Cart;
use storefront_commerce::catalog::{Category, Product, ProductPage, ProductQuery};
use storefront_commerce::checkout::{Order, OrderRequest, SavedAddress};
use storefront_commerce::customer::User;
use storefront_commerce::ids::{CartItemId, ProductId};

/// Response from POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// The Auth collaborator: token issuance and identity.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// GET /profile — the user behind the current bearer token.
    ///
    /// Fails with an auth-class error when the token is expired,
    /// invalid, or absent.
    async fn profile(&self) -> Result<User, ApiError>;

    /// POST /auth/login.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// POST /auth/logout. Best-effort; callers clear local state
    /// regardless of the outcome.
    async fn logout(&self) -> Result<(), ApiError>;
}

/// The remote Cart collaborator, keyed by the authenticated user.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// GET /cart — the full account cart including derived totals.
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;

    /// POST /cart/items.
    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError>;

    /// PUT /cart/items/:itemId.
    async fn update_item(&self, item_id: &CartItemId, quantity: u32) -> Result<(), ApiError>;

    /// DELETE /cart/items/:itemId.
    async fn remove_item(&self, item_id: &CartItemId) -> Result<(), ApiError>;

    /// DELETE /cart.
    async fn clear(&self) -> Result<(), ApiError>;
}

/// The Order collaborator.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// POST /orders — submit an order and receive the placed order.
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError>;
}

/// The Address collaborator.
#[async_trait]
pub trait AddressApi: Send + Sync {
    /// GET /addresses — the user's saved addresses.
    async fn list_addresses(&self) -> Result<Vec<SavedAddress>, ApiError>;
}

/// The read-only Catalog collaborator.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// GET /products with filter/sort/page params.
    async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError>;

    /// GET /products/:id.
    async fn product(&self, id: &ProductId) -> Result<Product, ApiError>;

    /// GET /categories.
    async fn categories(&self) -> Result<Vec<Category>, ApiError>;
}
