//! Domain types and logic for the storefront client core.
//!
//! This crate holds the pure, I/O-free half of the storefront:
//!
//! - **Ids and money**: newtype identifiers and cents-based `Money`
//! - **Customer**: user identity and roles
//! - **Catalog**: read-only product/category types and query building
//! - **Cart**: the canonical cart shape plus guest-mode mutations
//! - **Checkout**: shipping/payment forms, validation, and order types
//!
//! Network-backed behavior (account carts, order submission, token
//! validation) lives in `storefront-api` and `storefront-app`; the
//! types here are shared by both sides so the guest and account code
//! paths produce the identical shapes.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod error;
pub mod ids;
pub mod money;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartItem};
    pub use crate::catalog::{Category, Product, ProductPage, ProductQuery, SortOption};
    pub use crate::checkout::{
        CardForm, CheckoutStep, Order, OrderRequest, OrderStatus, PaymentMethod, SavedAddress,
        ShippingForm, ShippingInfo,
    };
    pub use crate::customer::{Role, User};
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
}
