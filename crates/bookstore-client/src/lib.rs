use std::time::Duration;

use anyhow::Context;
use bookstore_types::domain::book::{Book, NewBook};
use bookstore_types::domain::cart::CartView;
use bookstore_types::domain::category::{Category, NewCategory};
use bookstore_types::domain::order::{Order, OrderItem, OrderStatus};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::domain::search::BookSearchParameters;
use bookstore_types::domain::user::{NewUser, User};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header the server reads the caller's id from.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct BookstoreClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
    user: Option<Uuid>,
}

/// Typed client for the bookstore HTTP API.
#[derive(Clone)]
pub struct BookstoreClient {
    base: Url,
    client: reqwest::Client,
    user: Option<Uuid>,
}

impl BookstoreClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<BookstoreClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(BookstoreClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
            user: None,
        })
    }

    /// A client sharing this one's connection pool that calls as `user_id`.
    pub fn as_user(&self, user_id: Uuid) -> Self {
        Self {
            user: Some(user_id),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "bookstore request");
        let req = self.client.request(method, url);
        Ok(match self.user {
            Some(id) => req.header(USER_ID_HEADER, id.to_string()),
            None => req,
        })
    }

    async fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> anyhow::Result<T> {
        let res = req.send().await?.error_for_status()?;
        Ok(res.json().await?)
    }

    async fn execute(req: RequestBuilder) -> anyhow::Result<()> {
        req.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn health(&self) -> anyhow::Result<()> {
        Self::execute(self.request(Method::GET, "health")?).await
    }

    pub async fn register(&self, user: &NewUser) -> anyhow::Result<User> {
        Self::fetch(self.request(Method::POST, "auth/registration")?.json(user)).await
    }

    pub async fn list_books(&self, page: PageRequest) -> anyhow::Result<Page<Book>> {
        Self::fetch(self.request(Method::GET, "books")?.query(&page)).await
    }

    pub async fn get_book(&self, id: Uuid) -> anyhow::Result<Book> {
        Self::fetch(self.request(Method::GET, &format!("books/{id}"))?).await
    }

    pub async fn create_book(&self, book: &NewBook) -> anyhow::Result<Book> {
        Self::fetch(self.request(Method::POST, "books")?.json(book)).await
    }

    pub async fn update_book(&self, id: Uuid, book: &NewBook) -> anyhow::Result<Book> {
        Self::fetch(self.request(Method::PUT, &format!("books/{id}"))?.json(book)).await
    }

    pub async fn delete_book(&self, id: Uuid) -> anyhow::Result<()> {
        Self::execute(self.request(Method::DELETE, &format!("books/{id}"))?).await
    }

    /// Every filter is sent as one comma-joined value. A filter with no
    /// values is still sent so that the server can reject unknown keys.
    pub async fn search_books(
        &self,
        params: &BookSearchParameters,
        page: PageRequest,
    ) -> anyhow::Result<Page<Book>> {
        Self::fetch(
            self.request(Method::GET, "books/search")?
                .query(&search_query(params, page)),
        )
        .await
    }

    pub async fn list_categories(&self, page: PageRequest) -> anyhow::Result<Page<Category>> {
        Self::fetch(self.request(Method::GET, "categories")?.query(&page)).await
    }

    pub async fn get_category(&self, id: Uuid) -> anyhow::Result<Category> {
        Self::fetch(self.request(Method::GET, &format!("categories/{id}"))?).await
    }

    pub async fn books_in_category(
        &self,
        id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<Page<Book>> {
        Self::fetch(
            self.request(Method::GET, &format!("categories/{id}/books"))?
                .query(&page),
        )
        .await
    }

    pub async fn create_category(&self, category: &NewCategory) -> anyhow::Result<Category> {
        Self::fetch(self.request(Method::POST, "categories")?.json(category)).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        category: &NewCategory,
    ) -> anyhow::Result<Category> {
        Self::fetch(
            self.request(Method::PUT, &format!("categories/{id}"))?
                .json(category),
        )
        .await
    }

    pub async fn delete_category(&self, id: Uuid) -> anyhow::Result<()> {
        Self::execute(self.request(Method::DELETE, &format!("categories/{id}"))?).await
    }

    pub async fn add_to_cart(&self, book_id: Uuid, quantity: i64) -> anyhow::Result<CartView> {
        Self::fetch(
            self.request(Method::POST, "cart")?
                .json(&AddItemRequest { book_id, quantity }),
        )
        .await
    }

    pub async fn get_cart(&self) -> anyhow::Result<CartView> {
        Self::fetch(self.request(Method::GET, "cart")?).await
    }

    pub async fn update_cart_item(&self, item_id: Uuid, quantity: i64) -> anyhow::Result<CartView> {
        Self::fetch(
            self.request(Method::PUT, &format!("cart/items/{item_id}"))?
                .json(&UpdateQuantityRequest { quantity }),
        )
        .await
    }

    pub async fn delete_cart_item(&self, item_id: Uuid) -> anyhow::Result<()> {
        Self::execute(self.request(Method::DELETE, &format!("cart/items/{item_id}"))?).await
    }

    pub async fn clear_cart(&self) -> anyhow::Result<()> {
        Self::execute(self.request(Method::DELETE, "cart")?).await
    }

    pub async fn create_order(&self, shipping_address: &str) -> anyhow::Result<Order> {
        Self::fetch(
            self.request(Method::POST, "orders")?
                .json(&CreateOrderRequest {
                    shipping_address: shipping_address.to_string(),
                }),
        )
        .await
    }

    pub async fn list_orders(&self, page: PageRequest) -> anyhow::Result<Page<Order>> {
        Self::fetch(self.request(Method::GET, "orders")?.query(&page)).await
    }

    pub async fn get_order(&self, id: Uuid) -> anyhow::Result<Order> {
        Self::fetch(self.request(Method::GET, &format!("orders/{id}"))?).await
    }

    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> anyhow::Result<Order> {
        Self::fetch(
            self.request(Method::PATCH, &format!("orders/{id}"))?
                .json(&UpdateStatusRequest { status }),
        )
        .await
    }

    pub async fn delete_order(&self, id: Uuid) -> anyhow::Result<()> {
        Self::execute(self.request(Method::DELETE, &format!("orders/{id}"))?).await
    }

    pub async fn order_items(&self, order_id: Uuid) -> anyhow::Result<Vec<OrderItem>> {
        Self::fetch(self.request(Method::GET, &format!("orders/{order_id}/items"))?).await
    }

    pub async fn order_item(&self, order_id: Uuid, item_id: Uuid) -> anyhow::Result<OrderItem> {
        Self::fetch(
            self.request(Method::GET, &format!("orders/{order_id}/items/{item_id}"))?,
        )
        .await
    }

    pub async fn admin_order_items(&self, order_id: Uuid) -> anyhow::Result<Vec<OrderItem>> {
        Self::fetch(
            self.request(Method::GET, &format!("orders/admin/{order_id}/items"))?,
        )
        .await
    }
}

fn search_query(params: &BookSearchParameters, page: PageRequest) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = params
        .filters
        .iter()
        .map(|(key, values)| (key.clone(), values.join(",")))
        .collect();
    query.push(("page".into(), page.page.to_string()));
    query.push(("size".into(), page.size.to_string()));
    query
}

impl BookstoreClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn as_user(mut self, user_id: Uuid) -> Self {
        self.user = Some(user_id);
        self
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<BookstoreClient> {
        if let Some(client) = self.client {
            return Ok(BookstoreClient {
                base: self.base,
                client,
                user: self.user,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(BookstoreClient {
            base: self.base,
            client,
            user: self.user,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddItemRequest {
    pub book_id: Uuid,
    pub quantity: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub shipping_address: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct UpdateStatusRequest {
    status: OrderStatus,
}
