//! The reqwest-backed collaborator adapter.
//!
//! One client implements every contract. Reads go through the
//! single-retry policy; mutations are sent exactly once. The bearer
//! token is re-read from the [`TokenStore`] on each request so a
//! login or logout is visible to the very next call.

use crate::config::{ApiConfig, ConfigError};
use crate::contracts::{AddressApi, AuthApi, CartApi, CatalogApi, LoginResponse, OrderApi};
use crate::error::{ApiError, ErrorCode};
use crate::retry::RetryPolicy;
use crate::token::TokenStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use storefront_commerce::cart::Cart;
use storefront_commerce::catalog::{Category, Product, ProductPage, ProductQuery};
use storefront_commerce::checkout::{Order, OrderRequest, SavedAddress};
use storefront_commerce::customer::User;
use storefront_commerce::ids::{CartItemId, ProductId};

/// HTTP implementation of the collaborator contracts.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: url::Url,
    tokens: Arc<dyn TokenStore>,
    read_retry: RetryPolicy,
}

impl HttpApi {
    /// Build an adapter from config and a token store.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let base_url = config.parsed_base_url()?;
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            tokens,
            read_retry: RetryPolicy::reads(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::connect(format!("invalid endpoint {path}: {e}")))
    }

    /// Attach the bearer token, re-read from storage per call.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.load() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET with the read retry policy.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let mut attempt = 0;
        loop {
            tracing::debug!(%url, attempt, "GET");
            let request = self.authed(self.client.get(url.clone()).query(params));
            match self.read_response(request).await {
                Ok(value) => return Ok(value),
                Err(err) if self.read_retry.should_retry(&err, attempt) => {
                    tracing::warn!(%url, error = %err, "read query failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.read_retry.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Send a mutation and decode the response body. Never retried.
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, method = %method, "mutation");
        let mut request = self.authed(self.client.request(method, url));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.read_response(request).await
    }

    /// Send a mutation and discard the response body. Never retried.
    async fn send_unit(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, method = %method, "mutation");
        let mut request = self.authed(self.client.request(method, url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(normalize_failure(response).await)
        }
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::decode(e.to_string()))
        } else {
            Err(normalize_failure(response).await)
        }
    }
}

fn map_reqwest_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout(error.to_string())
    } else if error.is_decode() {
        ApiError::decode(error.to_string())
    } else {
        ApiError::connect(error.to_string())
    }
}

/// Error body shape the collaborators use on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Reduce a non-success response to the normalized error shape.
async fn normalize_failure(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let fallback = response
        .status()
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<ErrorBody> = serde_json::from_str(&body).ok();
    let (message, code) = match parsed {
        Some(body) => (
            body.message.unwrap_or(fallback),
            body.code.as_deref().and_then(ErrorCode::from_wire),
        ),
        None => (fallback, None),
    };
    ApiError::status(status, message, code)
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn profile(&self) -> Result<User, ApiError> {
        let user: wire::WireUser = self.get_json("/profile", &[]).await?;
        Ok(user.into())
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = wire::LoginBody {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: wire::WireLogin = self
            .send_json(reqwest::Method::POST, "/auth/login", Some(&body))
            .await?;
        Ok(LoginResponse {
            token: response.token,
            user: response.user.into(),
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send_unit(reqwest::Method::POST, "/auth/logout", None::<&()>)
            .await
    }
}

#[async_trait]
impl CartApi for HttpApi {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        let cart: wire::WireCart = self.get_json("/cart", &[]).await?;
        Ok(cart.into())
    }

    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = wire::AddItemBody {
            product_id: product_id.to_string(),
            quantity,
        };
        self.send_unit(reqwest::Method::POST, "/cart/items", Some(&body))
            .await
    }

    async fn update_item(&self, item_id: &CartItemId, quantity: u32) -> Result<(), ApiError> {
        let body = wire::UpdateItemBody { quantity };
        self.send_unit(
            reqwest::Method::PUT,
            &format!("/cart/items/{item_id}"),
            Some(&body),
        )
        .await
    }

    async fn remove_item(&self, item_id: &CartItemId) -> Result<(), ApiError> {
        self.send_unit(
            reqwest::Method::DELETE,
            &format!("/cart/items/{item_id}"),
            None::<&()>,
        )
        .await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.send_unit(reqwest::Method::DELETE, "/cart", None::<&()>)
            .await
    }
}

#[async_trait]
impl OrderApi for HttpApi {
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let order: wire::WireOrder = self
            .send_json(reqwest::Method::POST, "/orders", Some(request))
            .await?;
        Ok(order.into())
    }
}

#[async_trait]
impl AddressApi for HttpApi {
    async fn list_addresses(&self) -> Result<Vec<SavedAddress>, ApiError> {
        self.get_json("/addresses", &[]).await
    }
}

#[async_trait]
impl CatalogApi for HttpApi {
    async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let params = query.to_params();
        let page: wire::WireProductPage = self.get_json("/products", &params).await?;
        Ok(page.into())
    }

    async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let product: wire::WireProduct = self.get_json(&format!("/products/{id}"), &[]).await?;
        Ok(product.into())
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories", &[]).await
    }
}

/// Wire DTOs and conversions into the canonical domain types.
///
/// The collaborators speak camelCase JSON with decimal-dollar prices;
/// everything is converted at this boundary so guest and account code
/// paths share one shape.
mod wire {
    use serde::{Deserialize, Serialize};
    use storefront_commerce::cart::{Cart, CartItem};
    use storefront_commerce::catalog::{Product, ProductPage};
    use storefront_commerce::checkout::{Order, OrderItem, OrderStatus, ShippingInfo};
    use storefront_commerce::customer::{Role, User};
    use storefront_commerce::ids::{CartItemId, OrderId, ProductId, UserId};
    use storefront_commerce::money::{Currency, Money};

    fn money(amount: f64) -> Money {
        Money::from_decimal(amount, Currency::USD)
    }

    #[derive(Debug, Serialize)]
    pub struct LoginBody {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AddItemBody {
        pub product_id: String,
        pub quantity: u32,
    }

    #[derive(Debug, Serialize)]
    pub struct UpdateItemBody {
        pub quantity: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct WireUser {
        pub id: String,
        #[serde(default)]
        pub name: String,
        pub email: String,
        pub role: Role,
    }

    impl From<WireUser> for User {
        fn from(user: WireUser) -> Self {
            User {
                id: UserId::new(user.id),
                name: user.name,
                email: user.email,
                role: user.role,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct WireLogin {
        pub token: String,
        pub user: WireUser,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WireProduct {
        pub id: String,
        pub name: String,
        pub price: f64,
        #[serde(default)]
        pub image_url: Option<String>,
        #[serde(default)]
        pub brand: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub rating: Option<f64>,
    }

    impl From<WireProduct> for Product {
        fn from(product: WireProduct) -> Self {
            Product {
                id: ProductId::new(product.id),
                name: product.name,
                price: money(product.price),
                image_url: product.image_url,
                brand: product.brand,
                description: product.description,
                category: product.category,
                rating: product.rating,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WireProductPage {
        #[serde(default)]
        pub products: Vec<WireProduct>,
        pub total: i64,
        pub page: i64,
        pub total_pages: i64,
    }

    impl From<WireProductPage> for ProductPage {
        fn from(page: WireProductPage) -> Self {
            ProductPage {
                products: page.products.into_iter().map(Into::into).collect(),
                total: page.total,
                page: page.page,
                total_pages: page.total_pages,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct WireCartItem {
        pub id: String,
        pub product: WireProduct,
        pub quantity: u32,
    }

    impl From<WireCartItem> for CartItem {
        fn from(item: WireCartItem) -> Self {
            CartItem {
                id: CartItemId::new(item.id),
                product: item.product.into(),
                quantity: item.quantity,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct WireCart {
        #[serde(default)]
        pub items: Vec<WireCartItem>,
        #[serde(default)]
        pub subtotal: Option<f64>,
        #[serde(default)]
        pub shipping: Option<f64>,
        #[serde(default)]
        pub total: Option<f64>,
    }

    impl From<WireCart> for Cart {
        fn from(cart: WireCart) -> Self {
            Cart {
                items: cart.items.into_iter().map(Into::into).collect(),
                subtotal: cart.subtotal.map(money),
                shipping: cart.shipping.map(money),
                total: cart.total.map(money),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WireOrderItem {
        pub product_id: String,
        pub name: String,
        pub price: f64,
        pub quantity: u32,
    }

    impl From<WireOrderItem> for OrderItem {
        fn from(item: WireOrderItem) -> Self {
            OrderItem {
                product_id: ProductId::new(item.product_id),
                name: item.name,
                price: money(item.price),
                quantity: item.quantity,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WireOrder {
        pub id: String,
        #[serde(default)]
        pub status: OrderStatus,
        #[serde(default)]
        pub items: Vec<WireOrderItem>,
        pub shipping_info: ShippingInfo,
        #[serde(default)]
        pub subtotal: Option<f64>,
        #[serde(default)]
        pub shipping: Option<f64>,
        #[serde(default)]
        pub total: Option<f64>,
    }

    impl From<WireOrder> for Order {
        fn from(order: WireOrder) -> Self {
            Order {
                id: OrderId::new(order.id),
                status: order.status,
                items: order.items.into_iter().map(Into::into).collect(),
                shipping_info: order.shipping_info,
                subtotal: order.subtotal.map(money),
                shipping: order.shipping.map(money),
                total: order.total.map(money),
            }
        }
    }
}
