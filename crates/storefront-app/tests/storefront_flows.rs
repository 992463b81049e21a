//! End-to-end service flows against an in-memory backend.
//!
//! These exercise the facade the way a UI would: startup validation,
//! login and logout, guest and account carts, and the full checkout
//! wizard, with the backend scripted per scenario.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storefront_api::{
    AddressApi, ApiError, AuthApi, CartApi, ErrorCode, LoginResponse, MemoryTokenStore, OrderApi,
    TokenStore,
};
use storefront_app::{
    CartError, CartMode, CheckoutError, CheckoutState, GuardDecision, NavigationTarget, Storefront,
    ValidateOutcome,
};
use storefront_commerce::cart::{Cart, CartItem};
use storefront_commerce::catalog::Product;
use storefront_commerce::checkout::{
    CheckoutStep, Order, OrderStatus, PaymentMethod, SavedAddress, ShippingForm,
};
use storefront_commerce::customer::{Role, User};
use storefront_commerce::error::CommerceError;
use storefront_commerce::ids::{AddressId, OrderId, ProductId, UserId};
use storefront_commerce::money::{Currency, Money};

/// Scripted in-memory backend implementing all four API ports.
///
/// The cart side behaves like a tiny server: mutations update a held
/// cart and recompute totals, and reads return a snapshot. Auth and
/// order responses are queued per test.
#[derive(Default)]
struct MockBackend {
    catalog: Mutex<Vec<Product>>,
    cart: Mutex<Cart>,
    profile_queue: Mutex<VecDeque<Result<User, ApiError>>>,
    default_profile: Mutex<Option<User>>,
    login_response: Mutex<Option<Result<LoginResponse, ApiError>>>,
    logout_response: Mutex<Option<ApiError>>,
    fail_next_mutation: Mutex<Option<ApiError>>,
    order_queue: Mutex<VecDeque<Result<Order, ApiError>>>,
    saved_addresses: Mutex<Vec<SavedAddress>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
    create_order_calls: AtomicUsize,
}

impl MockBackend {
    fn recompute_totals(cart: &mut Cart) {
        let subtotal = cart
            .local_subtotal()
            .unwrap_or_else(|_| Money::zero(Currency::USD));
        let shipping = if cart.is_empty() {
            Money::zero(Currency::USD)
        } else {
            Money::new(500, Currency::USD)
        };
        cart.total = subtotal.try_add(&shipping);
        cart.subtotal = Some(subtotal);
        cart.shipping = Some(shipping);
    }

    fn take_mutation_failure(&self) -> Result<(), ApiError> {
        match self.fail_next_mutation.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn server_cart(&self) -> Cart {
        self.cart.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for MockBackend {
    async fn profile(&self) -> Result<User, ApiError> {
        if let Some(result) = self.profile_queue.lock().unwrap().pop_front() {
            return result;
        }
        match self.default_profile.lock().unwrap().clone() {
            Some(user) => Ok(user),
            None => Err(ApiError::status(
                401,
                "Not authorized",
                Some(ErrorCode::NoToken),
            )),
        }
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        self.login_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ApiError::status(401, "Invalid credentials", None)))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        match self.logout_response.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CartApi for MockBackend {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.server_cart())
    }

    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        self.take_mutation_failure()?;
        let product = self
            .catalog
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == product_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "Product not found", None))?;
        let mut cart = self.cart.lock().unwrap();
        match cart.items.iter_mut().find(|i| &i.product.id == product_id) {
            Some(item) => item.quantity += quantity,
            None => cart.items.push(CartItem::new(product, quantity)),
        }
        Self::recompute_totals(&mut cart);
        Ok(())
    }

    async fn update_item(
        &self,
        item_id: &storefront_commerce::ids::CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.take_mutation_failure()?;
        let mut cart = self.cart.lock().unwrap();
        let item = cart
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| ApiError::status(404, "Cart item not found", None))?;
        item.quantity = quantity;
        Self::recompute_totals(&mut cart);
        Ok(())
    }

    async fn remove_item(
        &self,
        item_id: &storefront_commerce::ids::CartItemId,
    ) -> Result<(), ApiError> {
        self.take_mutation_failure()?;
        let mut cart = self.cart.lock().unwrap();
        cart.items.retain(|i| &i.id != item_id);
        Self::recompute_totals(&mut cart);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.take_mutation_failure()?;
        let mut cart = self.cart.lock().unwrap();
        cart.clear();
        Ok(())
    }
}

#[async_trait]
impl OrderApi for MockBackend {
    async fn create_order(
        &self,
        _request: &storefront_commerce::checkout::OrderRequest,
    ) -> Result<Order, ApiError> {
        self.create_order_calls.fetch_add(1, Ordering::SeqCst);
        self.order_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::status(500, "No order scripted", None)))
    }
}

#[async_trait]
impl AddressApi for MockBackend {
    async fn list_addresses(&self) -> Result<Vec<SavedAddress>, ApiError> {
        Ok(self.saved_addresses.lock().unwrap().clone())
    }
}

fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::USD)
}

fn product(id: &str, name: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.into(),
        price: usd(cents),
        image_url: None,
        brand: None,
        description: None,
        category: None,
        rating: None,
    }
}

fn customer(role: Role) -> User {
    User::new(UserId::new("u1"), "Ada Lovelace", "ada@example.com", role)
}

fn auth_failure(code: ErrorCode) -> ApiError {
    ApiError::status(401, "Not authorized, token failed", Some(code))
}

fn storefront(backend: &Arc<MockBackend>, tokens: Arc<MemoryTokenStore>) -> Storefront {
    Storefront::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        tokens,
    )
}

/// A backend with a catalog, a scripted login for `role`, and the
/// matching default profile.
fn signed_in_backend(role: Role) -> Arc<MockBackend> {
    let backend = Arc::new(MockBackend::default());
    *backend.catalog.lock().unwrap() = vec![
        product("p1", "Mechanical Keyboard", 1000),
        product("p2", "Trackball", 2000),
    ];
    *backend.login_response.lock().unwrap() = Some(Ok(LoginResponse {
        token: "tok-123".into(),
        user: customer(role),
    }));
    *backend.default_profile.lock().unwrap() = Some(customer(role));
    backend
}

fn fill_shipping(form: &mut ShippingForm) {
    form.first_name = "Ada".into();
    form.last_name = "Lovelace".into();
    form.email = "ada@example.com".into();
    form.phone = "555-0100".into();
    form.address = "1 Analytical Way".into();
    form.city = "London".into();
    form.state = "LDN".into();
    form.postal_code = "SW1A".into();
    form.country = "UK".into();
}

fn scripted_order() -> Order {
    Order {
        id: OrderId::new("ord-1"),
        status: OrderStatus::Pending,
        items: Vec::new(),
        shipping_info: ShippingForm::default().snapshot(),
        subtotal: Some(usd(4000)),
        shipping: Some(usd(500)),
        total: Some(usd(4500)),
    }
}

/// Drive the facade to the review step with valid forms and a cart
/// holding one line of `p1`.
async fn at_review(store: &mut Storefront) {
    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 2)
        .await
        .unwrap();
    store.begin_checkout().unwrap();
    fill_shipping(store.checkout_mut().shipping_mut());
    store.checkout_mut().set_payment_method(PaymentMethod::Paypal);
    assert_eq!(store.checkout_mut().advance().unwrap(), CheckoutStep::Payment);
    assert_eq!(store.checkout_mut().advance().unwrap(), CheckoutStep::Review);
}

#[tokio::test]
async fn admin_login_navigates_to_dashboard() {
    let backend = signed_in_backend(Role::Admin);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    let target = store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(target, NavigationTarget::AdminDashboard);
    assert_eq!(target.path(), "/admin/dashboard");
}

#[tokio::test]
async fn user_login_navigates_home_and_loads_account_cart() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    let target = store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(target, NavigationTarget::Home);
    assert!(store.session().is_authenticated());
    assert_eq!(store.cart().mode(), CartMode::Account);
}

#[tokio::test]
async fn startup_validation_without_token_is_anonymous() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    let outcome = store.validate_token().await.unwrap();
    assert_eq!(outcome, ValidateOutcome::Anonymous);
    assert!(!store.session().is_authenticated());
    assert_eq!(store.cart().mode(), CartMode::Guest);
}

#[tokio::test]
async fn startup_validation_with_valid_token_restores_session() {
    let backend = signed_in_backend(Role::User);
    let tokens = Arc::new(MemoryTokenStore::with_token("tok-123"));
    let mut store = storefront(&backend, tokens);

    let outcome = store.validate_token().await.unwrap();
    assert_eq!(outcome, ValidateOutcome::Authenticated);
    assert!(store.session().is_authenticated());
    assert_eq!(store.cart().mode(), CartMode::Account);
}

#[tokio::test]
async fn startup_validation_with_rejected_token_clears_it() {
    let backend = Arc::new(MockBackend::default());
    backend
        .profile_queue
        .lock()
        .unwrap()
        .push_back(Err(auth_failure(ErrorCode::TokenExpired)));
    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let mut store = storefront(&backend, tokens.clone());

    let outcome = store.validate_token().await.unwrap();
    assert_eq!(outcome, ValidateOutcome::Revoked);
    assert!(!store.session().is_authenticated());
    assert_eq!(tokens.load(), None);
}

#[tokio::test]
async fn logout_clears_local_state_even_when_request_fails() {
    let backend = signed_in_backend(Role::User);
    let tokens = Arc::new(MemoryTokenStore::new());
    let mut store = storefront(&backend, tokens.clone());
    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(tokens.load().as_deref(), Some("tok-123"));

    *backend.logout_response.lock().unwrap() =
        Some(ApiError::connect("connection refused"));
    let target = store.logout().await;

    assert_eq!(target, NavigationTarget::Login);
    assert!(!store.session().is_authenticated());
    assert_eq!(tokens.load(), None);
    assert_eq!(store.cart().mode(), CartMode::Guest);
    assert!(store.cart().cart().is_empty());
}

#[tokio::test]
async fn login_replaces_guest_cart_and_logout_resets_it() {
    let backend = signed_in_backend(Role::User);
    // The account already has one trackball in its server cart.
    backend
        .cart
        .lock()
        .unwrap()
        .items
        .push(CartItem::new(product("p2", "Trackball", 2000), 1));
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 3)
        .await
        .unwrap();
    assert_eq!(store.cart().cart().item_count(), 3);

    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    // Account cart wins outright; the guest lines are gone.
    assert_eq!(store.cart().cart().line_count(), 1);
    assert_eq!(
        store.cart().cart().items[0].product.id,
        ProductId::new("p2")
    );

    store.logout().await;
    assert!(store.cart().cart().is_empty());
    assert_eq!(store.cart().mode(), CartMode::Guest);
}

#[tokio::test]
async fn account_mutation_reloads_cart_with_server_totals() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();

    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 2)
        .await
        .unwrap();
    store
        .cart_mut()
        .add_to_cart(product("p2", "Trackball", 2000), 1)
        .await
        .unwrap();

    let cart = store.cart().cart();
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.subtotal, Some(usd(4000)));
    assert_eq!(cart.shipping, Some(usd(500)));
    assert_eq!(cart.total, Some(usd(4500)));
    assert_eq!(store.cart().subtotal().unwrap(), usd(4000));
}

#[tokio::test]
async fn failed_mutation_keeps_last_good_cart() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 2)
        .await
        .unwrap();
    let before = store.cart().cart().clone();
    let item_id = before.items[0].id.clone();

    *backend.fail_next_mutation.lock().unwrap() =
        Some(ApiError::timeout("request timed out"));
    let err = store.cart_mut().update_item(&item_id, 5).await.unwrap_err();

    assert!(matches!(err, CartError::Api(_)));
    assert_eq!(store.cart().cart(), &before);
}

#[tokio::test]
async fn zero_quantity_is_rejected_without_an_api_call() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 1)
        .await
        .unwrap();
    let item_id = store.cart().cart().items[0].id.clone();

    let err = store.cart_mut().update_item(&item_id, 0).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::Commerce(CommerceError::InvalidQuantity(0))
    ));
    assert_eq!(backend.update_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.cart().cart().items[0].quantity, 1);
}

#[tokio::test]
async fn guest_cart_works_fully_offline() {
    let backend = Arc::new(MockBackend::default());
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 2)
        .await
        .unwrap();
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 1)
        .await
        .unwrap();
    // Same product merges into one line.
    assert_eq!(store.cart().cart().line_count(), 1);
    assert_eq!(store.cart().cart().item_count(), 3);
    assert_eq!(store.cart().subtotal().unwrap(), usd(3000));
    assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn checkout_refuses_an_empty_cart() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    let err = store.begin_checkout().unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn blank_city_blocks_the_shipping_step() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 1)
        .await
        .unwrap();
    store.begin_checkout().unwrap();

    fill_shipping(store.checkout_mut().shipping_mut());
    store.checkout_mut().shipping_mut().city = "  ".into();

    let err = store.checkout_mut().advance().unwrap_err();
    match err {
        CheckoutError::MissingFields(fields) => assert_eq!(fields, vec!["city"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.checkout().step(), CheckoutStep::Shipping);

    store.checkout_mut().shipping_mut().city = "London".into();
    assert_eq!(
        store.checkout_mut().advance().unwrap(),
        CheckoutStep::Payment
    );
}

#[tokio::test]
async fn paypal_passes_the_payment_step_with_a_blank_card() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 1)
        .await
        .unwrap();
    store.begin_checkout().unwrap();
    fill_shipping(store.checkout_mut().shipping_mut());
    store.checkout_mut().advance().unwrap();

    // Card required when paying by card.
    store
        .checkout_mut()
        .set_payment_method(PaymentMethod::CreditCard);
    assert!(matches!(
        store.checkout_mut().advance(),
        Err(CheckoutError::MissingFields(_))
    ));

    store.checkout_mut().set_payment_method(PaymentMethod::Paypal);
    assert_eq!(
        store.checkout_mut().advance().unwrap(),
        CheckoutStep::Review
    );
}

#[tokio::test]
async fn submit_away_from_review_is_refused() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 1)
        .await
        .unwrap();
    store.begin_checkout().unwrap();

    let err = store.submit_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::NotAtReview));
    assert_eq!(backend.create_order_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_session_aborts_submission_and_keeps_the_cart() {
    let backend = signed_in_backend(Role::User);
    let tokens = Arc::new(MemoryTokenStore::new());
    let mut store = storefront(&backend, tokens.clone());
    at_review(&mut store).await;

    // The liveness probe finds the token expired.
    backend
        .profile_queue
        .lock()
        .unwrap()
        .push_back(Err(auth_failure(ErrorCode::TokenExpired)));

    let err = store.submit_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::SessionExpired));
    assert_eq!(backend.create_order_calls.load(Ordering::SeqCst), 0);
    assert!(!store.session().is_authenticated());
    assert_eq!(tokens.load(), None);
    // The cart is for the next session to reconcile, not to discard.
    assert_eq!(store.cart().cart().item_count(), 2);
}

#[tokio::test]
async fn successful_submission_clears_the_cart() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    at_review(&mut store).await;

    backend
        .order_queue
        .lock()
        .unwrap()
        .push_back(Ok(scripted_order()));

    let order_id = store.submit_order().await.unwrap();
    assert_eq!(order_id, OrderId::new("ord-1"));
    assert_eq!(
        store.checkout().state(),
        &CheckoutState::Submitted(OrderId::new("ord-1"))
    );
    assert!(store.cart().cart().is_empty());
    assert!(backend.server_cart().is_empty());
}

#[tokio::test]
async fn transient_submission_failure_stays_at_review_and_retries() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    at_review(&mut store).await;

    {
        let mut orders = backend.order_queue.lock().unwrap();
        orders.push_back(Err(ApiError::connect("connection reset")));
        orders.push_back(Ok(scripted_order()));
    }

    let err = store.submit_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Api(_)));
    assert_eq!(store.checkout().step(), CheckoutStep::Review);
    assert_eq!(store.checkout().state(), &CheckoutState::Editing);
    assert_eq!(store.cart().cart().item_count(), 2);

    let order_id = store.submit_order().await.unwrap();
    assert_eq!(order_id, OrderId::new("ord-1"));
}

#[tokio::test]
async fn order_rejection_for_expired_token_clears_the_session() {
    let backend = signed_in_backend(Role::User);
    let tokens = Arc::new(MemoryTokenStore::new());
    let mut store = storefront(&backend, tokens.clone());
    at_review(&mut store).await;

    // Liveness passes, but the order endpoint rejects the token.
    backend
        .order_queue
        .lock()
        .unwrap()
        .push_back(Err(auth_failure(ErrorCode::TokenInvalid)));

    let err = store.submit_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::SessionExpired));
    assert!(!store.session().is_authenticated());
    assert_eq!(tokens.load(), None);
}

#[tokio::test]
async fn saved_address_prefills_the_shipping_form() {
    let backend = signed_in_backend(Role::User);
    *backend.saved_addresses.lock().unwrap() = vec![SavedAddress {
        id: AddressId::new("a1"),
        name: Some("Home".into()),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: Some("ada@example.com".into()),
        phone: "555-0100".into(),
        address_line1: "1 Analytical Way".into(),
        address_line2: None,
        city: "London".into(),
        state: "LDN".into(),
        postal_code: "SW1A".into(),
        country: "UK".into(),
    }];
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));
    store
        .cart_mut()
        .add_to_cart(product("p1", "Mechanical Keyboard", 1000), 1)
        .await
        .unwrap();
    store.begin_checkout().unwrap();

    let addresses = store.checkout().saved_addresses().await.unwrap();
    assert_eq!(addresses.len(), 1);
    store.checkout_mut().select_address(&addresses[0]);

    assert_eq!(store.checkout().step(), CheckoutStep::Shipping);
    assert!(store
        .checkout_mut()
        .shipping_mut()
        .is_complete());
}

#[tokio::test]
async fn route_guards_follow_the_session() {
    let backend = signed_in_backend(Role::User);
    let mut store = storefront(&backend, Arc::new(MemoryTokenStore::new()));

    // Unresolved session: guarded routes wait.
    assert_eq!(store.guard_route(None), GuardDecision::Wait);

    store.validate_token().await.unwrap();
    assert_eq!(store.guard_route(None), GuardDecision::RedirectLogin);

    store
        .login_with_credentials("ada@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(store.guard_route(None), GuardDecision::Allow);
    assert_eq!(
        store.guard_route(Some(Role::Admin)),
        GuardDecision::RedirectHome
    );
}
