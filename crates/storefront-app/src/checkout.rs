//! The checkout flow.
//!
//! A three-step wizard over the checkout forms. Each step validates on
//! advance, not on entry, and the order is only ever submitted from
//! the review step with a live session.

use std::sync::Arc;

use storefront_api::{AddressApi, ApiError, OrderApi};
use storefront_commerce::cart::Cart;
use storefront_commerce::checkout::{
    CardForm, CheckoutStep, OrderRequest, PaymentMethod, SavedAddress, ShippingForm,
};
use storefront_commerce::error::CommerceError;
use storefront_commerce::ids::OrderId;
use thiserror::Error;

use crate::cart_store::CartStore;
use crate::session::{SessionError, SessionManager};

/// Checkout errors.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Checkout cannot start on an empty cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// Required fields on the current step are blank.
    #[error("missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    /// Submission was attempted away from the review step.
    #[error("order submission is only allowed at the review step")]
    NotAtReview,

    /// No signed-in user.
    #[error("checkout requires a signed-in user")]
    NotSignedIn,

    /// The session expired; it has been cleared and the visitor must
    /// log in again. Cart contents are untouched.
    #[error("session expired during checkout")]
    SessionExpired,

    /// A domain rule failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// A transient API failure; the flow stays where it was.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Whether the flow is still collecting input or has placed an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// The wizard is active.
    Editing,
    /// An order has been placed.
    Submitted(OrderId),
}

/// Drives the shipping / payment / review wizard.
pub struct CheckoutFlow {
    orders: Arc<dyn OrderApi>,
    addresses: Arc<dyn AddressApi>,
    step: CheckoutStep,
    shipping: ShippingForm,
    payment_method: PaymentMethod,
    card: CardForm,
    state: CheckoutState,
}

impl CheckoutFlow {
    /// Create a flow at the shipping step with blank forms.
    pub fn new(orders: Arc<dyn OrderApi>, addresses: Arc<dyn AddressApi>) -> Self {
        Self {
            orders,
            addresses,
            step: CheckoutStep::Shipping,
            shipping: ShippingForm::default(),
            payment_method: PaymentMethod::CreditCard,
            card: CardForm::default(),
            state: CheckoutState::Editing,
        }
    }

    /// The current wizard step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The current flow state.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Mutable access to the shipping form for field edits.
    pub fn shipping_mut(&mut self) -> &mut ShippingForm {
        &mut self.shipping
    }

    /// The selected payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Select a payment method.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Mutable access to the card form for field edits.
    pub fn card_mut(&mut self) -> &mut CardForm {
        &mut self.card
    }

    /// Begin checkout for the given cart.
    ///
    /// Refuses an empty cart; otherwise resets the wizard to a blank
    /// shipping step.
    pub fn start(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = CheckoutStep::Shipping;
        self.shipping = ShippingForm::default();
        self.payment_method = PaymentMethod::CreditCard;
        self.card = CardForm::default();
        self.state = CheckoutState::Editing;
        Ok(())
    }

    /// Advance to the next step after validating the current one.
    ///
    /// Shipping requires every address field; payment requires card
    /// details only when paying by card. Validation failure keeps the
    /// wizard where it is.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.validate_step(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Step back without validation; edits are preserved.
    pub fn back(&mut self) -> CheckoutStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Fetch the signed-in user's saved addresses for prefill.
    pub async fn saved_addresses(&self) -> Result<Vec<SavedAddress>, CheckoutError> {
        Ok(self.addresses.list_addresses().await?)
    }

    /// Prefill the shipping form from a saved address.
    ///
    /// Overwrites address fields, leaves notes alone, and keeps the
    /// wizard at its current step.
    pub fn select_address(&mut self, address: &SavedAddress) {
        self.shipping.apply_saved(address);
    }

    /// Place the order.
    ///
    /// Only valid at the review step. The session is re-checked first;
    /// expiry clears it and aborts with [`CheckoutError::SessionExpired`]
    /// while leaving the cart untouched. On success the server cart is
    /// cleared (best-effort) and the flow moves to `Submitted`.
    pub async fn submit(
        &mut self,
        session: &mut SessionManager,
        cart: &mut CartStore,
    ) -> Result<OrderId, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview);
        }
        // Forms may have been edited via back-navigation since their
        // steps were validated.
        self.validate_step(CheckoutStep::Shipping)?;
        self.validate_step(CheckoutStep::Payment)?;

        if !session.is_authenticated() {
            return Err(CheckoutError::NotSignedIn);
        }
        match session.ensure_live().await {
            Ok(()) => {}
            Err(SessionError::Expired) => return Err(CheckoutError::SessionExpired),
            Err(SessionError::NotSignedIn) => return Err(CheckoutError::NotSignedIn),
            Err(SessionError::Api(e)) => return Err(CheckoutError::Api(e)),
        }

        let request = OrderRequest {
            shipping_info: self.shipping.snapshot(),
            payment_method: self.payment_method,
            payment_info: (self.payment_method == PaymentMethod::CreditCard)
                .then(|| self.card.clone()),
        };

        match self.orders.create_order(&request).await {
            Ok(order) => {
                if let Err(e) = cart.clear().await {
                    tracing::warn!(error = %e, "order placed but cart clear failed");
                }
                tracing::info!(order = %order.id, "order placed");
                self.state = CheckoutState::Submitted(order.id.clone());
                Ok(order.id)
            }
            Err(e) if e.is_auth_error() => {
                tracing::warn!(error = %e, "order rejected for expired session");
                session.clear();
                Err(CheckoutError::SessionExpired)
            }
            Err(e) => Err(CheckoutError::Api(e)),
        }
    }

    fn validate_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        let missing = match step {
            CheckoutStep::Shipping => self.shipping.missing_fields(),
            CheckoutStep::Payment => match self.payment_method {
                PaymentMethod::CreditCard => self.card.missing_fields(),
                PaymentMethod::Paypal => Vec::new(),
            },
            CheckoutStep::Review => Vec::new(),
        };
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CheckoutError::MissingFields(missing))
        }
    }
}
