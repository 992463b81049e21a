//! Storefront application services.
//!
//! Wires the domain model ([`storefront_commerce`]) and the API layer
//! ([`storefront_api`]) into the stateful services a storefront UI
//! drives: session management, route guarding, the cart store, and
//! the checkout wizard. All state lives in these services; the
//! presentation layer renders snapshots and forwards intents.

pub mod cart_store;
pub mod checkout;
pub mod guard;
pub mod session;

pub use cart_store::{CartError, CartMode, CartStore};
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutState};
pub use guard::{guard_route, GuardDecision};
pub use session::{NavigationTarget, Session, SessionError, SessionManager, ValidateOutcome};

use std::sync::Arc;

use storefront_api::{AddressApi, ApiError, AuthApi, CartApi, OrderApi, TokenStore};
use storefront_commerce::customer::Role;
use storefront_commerce::ids::OrderId;

/// Top-level errors from the combined login flow.
#[derive(thiserror::Error, Debug)]
pub enum StorefrontError {
    /// The login request itself failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Loading the account cart after login failed; the session is
    /// still established.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// The application facade: one struct owning every service.
///
/// Cross-service sequencing lives here so call sites cannot get the
/// ordering wrong, e.g. the cart store always observes a session
/// change immediately after it happens.
pub struct Storefront {
    auth: Arc<dyn AuthApi>,
    session: SessionManager,
    cart: CartStore,
    checkout: CheckoutFlow,
}

impl Storefront {
    /// Wire up the services from the API ports and a token store.
    pub fn new(
        auth: Arc<dyn AuthApi>,
        carts: Arc<dyn CartApi>,
        orders: Arc<dyn OrderApi>,
        addresses: Arc<dyn AddressApi>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            auth: Arc::clone(&auth),
            session: SessionManager::new(auth, tokens),
            cart: CartStore::new(carts),
            checkout: CheckoutFlow::new(orders, addresses),
        }
    }

    /// The session service.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The cart service.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Mutable cart access for drawer toggles and direct mutations.
    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// The checkout service.
    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    /// Mutable checkout access for form edits and step navigation.
    pub fn checkout_mut(&mut self) -> &mut CheckoutFlow {
        &mut self.checkout
    }

    /// Validate any persisted token at startup and align the cart.
    pub async fn validate_token(&mut self) -> Result<ValidateOutcome, SessionError> {
        let outcome = self.session.validate_token().await;
        if let Err(e) = self.cart.sync_session(&self.session.session()).await {
            tracing::warn!(error = %e, "cart sync after startup validation failed");
        }
        outcome
    }

    /// Authenticate with credentials, establish the session, and load
    /// the account cart. Returns where to navigate next.
    pub async fn login_with_credentials(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<NavigationTarget, StorefrontError> {
        let response = self.auth.login(email, password).await?;
        let target = NavigationTarget::after_login(&response.user);
        self.session.login(&response.token, response.user);
        self.cart.sync_session(&self.session.session()).await?;
        Ok(target)
    }

    /// End the session and reset the cart to an empty guest cart.
    pub async fn logout(&mut self) -> NavigationTarget {
        let target = self.session.logout().await;
        if let Err(e) = self.cart.sync_session(&self.session.session()).await {
            tracing::warn!(error = %e, "cart reset after logout failed");
        }
        target
    }

    /// Decide access for a guarded route.
    pub fn guard_route(&self, required_role: Option<Role>) -> GuardDecision {
        guard_route(&self.session.session(), required_role)
    }

    /// Start the checkout wizard over the current cart.
    pub fn begin_checkout(&mut self) -> Result<(), CheckoutError> {
        self.checkout.start(self.cart.cart())
    }

    /// Place the order from the review step.
    pub async fn submit_order(&mut self) -> Result<OrderId, CheckoutError> {
        self.checkout.submit(&mut self.session, &mut self.cart).await
    }
}
