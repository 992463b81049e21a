//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in cart and checkout logic.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Quantity must be at least 1. Callers are expected to guard
    /// decrements at 1 rather than pass 0 through.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Item not in cart.
    #[error("item not in cart: {0}")]
    ItemNotInCart(String),

    /// Operation requires a non-empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Arithmetic overflow in a money calculation.
    #[error("arithmetic overflow in money calculation")]
    Overflow,

    /// Currency mismatch.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },
}
