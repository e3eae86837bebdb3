use axum::{
    routing::{get, post, put},
    serve, Router,
};
use bookstore_types::ports::Store;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers::{books, cart, categories, health, orders, users};
use crate::application::Services;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

#[derive(Clone)]
pub struct HttpServer<R: Store> {
    pub services: Arc<Services<R>>,
    pub config: HttpServerConfig,
}

impl<R: Store> HttpServer<R> {
    pub async fn new(services: Services<R>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            services: Arc::new(services),
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/auth/registration", post(users::register::<R>))
            .route(
                "/books",
                get(books::list_books::<R>).post(books::create_book::<R>),
            )
            .route("/books/search", get(books::search_books::<R>))
            .route(
                "/books/{id}",
                get(books::get_book::<R>)
                    .put(books::update_book::<R>)
                    .delete(books::delete_book::<R>),
            )
            .route(
                "/categories",
                get(categories::list_categories::<R>).post(categories::create_category::<R>),
            )
            .route(
                "/categories/{id}",
                get(categories::get_category::<R>)
                    .put(categories::update_category::<R>)
                    .delete(categories::delete_category::<R>),
            )
            .route(
                "/categories/{id}/books",
                get(categories::books_in_category::<R>),
            )
            .route(
                "/cart",
                post(cart::add_item::<R>)
                    .get(cart::get_cart::<R>)
                    .delete(cart::clear_cart::<R>),
            )
            .route(
                "/cart/items/{id}",
                put(cart::update_quantity::<R>).delete(cart::delete_item::<R>),
            )
            .route(
                "/orders",
                post(orders::create_order::<R>).get(orders::list_orders::<R>),
            )
            .route(
                "/orders/{id}",
                get(orders::get_order::<R>)
                    .patch(orders::update_status::<R>)
                    .delete(orders::delete_order::<R>),
            )
            .route("/orders/{id}/items", get(orders::items_for_user::<R>))
            .route(
                "/orders/{id}/items/{item_id}",
                get(orders::item_for_user::<R>),
            )
            .route(
                "/orders/admin/{id}/items",
                get(orders::items_for_admin::<R>),
            )
            .layer(trace_layer)
            .layer(CorsLayer::permissive())
            .with_state(self.services.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
