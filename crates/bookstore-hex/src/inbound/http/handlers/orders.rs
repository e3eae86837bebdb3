use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_types::domain::order::{Order, OrderItem, OrderStatus};
use bookstore_types::domain::page::Page;
use bookstore_types::ports::Store;
use serde::{Deserialize, Serialize};

use super::{no_content, parse_id, AppState, PageParams};
use crate::errors::AppError;
use crate::inbound::http::auth::{AdminUser, CurrentUser};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

pub async fn create_order<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = services
        .orders
        .create_order(user.id, payload.shipping_address)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Order>>, AppError> {
    Ok(Json(services.orders.get_orders(user.id, page.into()).await?))
}

pub async fn get_order<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(services.orders.get_order_by_id(parse_id(&id)?).await?))
}

pub async fn update_status<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = services
        .orders
        .update_order_status(parse_id(&id)?, payload.status)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(order)))
}

pub async fn delete_order<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    services.orders.delete_order(parse_id(&id)?).await?;
    Ok(no_content())
}

pub async fn items_for_user<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<OrderItem>>, AppError> {
    let items = services
        .orders
        .get_items_for_user(user.id, parse_id(&order_id)?)
        .await?;
    Ok(Json(items))
}

pub async fn item_for_user<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path((order_id, item_id)): Path<(String, String)>,
) -> Result<Json<OrderItem>, AppError> {
    let item = services
        .orders
        .get_item(user.id, parse_id(&order_id)?, parse_id(&item_id)?)
        .await?;
    Ok(Json(item))
}

pub async fn items_for_admin<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<OrderItem>>, AppError> {
    let items = services
        .orders
        .get_items_for_admin(parse_id(&order_id)?)
        .await?;
    Ok(Json(items))
}
