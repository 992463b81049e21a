//! Checkout types: wizard steps, forms, validation, and orders.

mod order;
mod payment;
mod shipping;
mod step;

pub use order::{Order, OrderItem, OrderRequest, OrderStatus};
pub use payment::{CardForm, PaymentMethod};
pub use shipping::{SavedAddress, ShippingForm, ShippingInfo};
pub use step::CheckoutStep;
