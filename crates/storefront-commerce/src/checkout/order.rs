//! Order types.
//!
//! Orders are produced by the checkout flow and owned by the remote
//! Order API; the types here cover the submission payload and the
//! response the confirmation view consumes.

use crate::checkout::{CardForm, PaymentMethod, ShippingInfo};
use crate::ids::{OrderId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order confirmed and processing.
    Confirmed,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// A line in a placed order, snapshotted from the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product at time of purchase.
    pub product_id: ProductId,
    /// Product name at time of purchase.
    pub name: String,
    /// Unit price at time of purchase.
    pub price: Money,
    /// Quantity purchased.
    pub quantity: u32,
}

/// A placed order, as returned by the Order API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Order status.
    pub status: OrderStatus,
    /// Items snapshot.
    pub items: Vec<OrderItem>,
    /// Shipping details snapshot.
    pub shipping_info: ShippingInfo,
    /// Subtotal before shipping.
    pub subtotal: Option<Money>,
    /// Shipping cost.
    pub shipping: Option<Money>,
    /// Grand total charged.
    pub total: Option<Money>,
}

/// Payload for POST /orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Shipping details snapshot.
    pub shipping_info: ShippingInfo,
    /// Chosen payment method.
    pub payment_method: PaymentMethod,
    /// Card details, present only for credit card payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<CardForm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping_info() -> ShippingInfo {
        ShippingInfo {
            name: "Ada Lovelace".into(),
            address_line1: "1 Analytical Way".into(),
            address_line2: String::new(),
            city: "London".into(),
            state: "LDN".into(),
            postal_code: "SW1".into(),
            country: "UK".into(),
            phone: "555-0100".into(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_paypal_request_omits_payment_info() {
        let request = OrderRequest {
            shipping_info: shipping_info(),
            payment_method: PaymentMethod::Paypal,
            payment_info: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("paymentInfo").is_none());
        assert_eq!(json["paymentMethod"], "paypal");
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }
}
