use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_types::domain::cart::CartView;
use bookstore_types::ports::Store;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{no_content, parse_id, AppState};
use crate::errors::AppError;
use crate::inbound::http::auth::CurrentUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub book_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

pub async fn add_item<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>), AppError> {
    let cart = services
        .carts
        .add_item(user.id, payload.book_id, payload.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

pub async fn get_cart<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(services.carts.get_cart(user.id).await?))
}

pub async fn clear_cart<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    services.carts.clear_cart(user.id).await?;
    Ok(no_content())
}

pub async fn update_quantity<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let cart = services
        .carts
        .update_quantity(user.id, parse_id(&item_id)?, payload.quantity)
        .await?;
    Ok(Json(cart))
}

pub async fn delete_item<R: Store>(
    State(services): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    services.carts.delete_item(user.id, parse_id(&item_id)?).await?;
    Ok(no_content())
}
