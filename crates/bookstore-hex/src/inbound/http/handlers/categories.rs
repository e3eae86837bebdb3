use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_types::domain::book::Book;
use bookstore_types::domain::category::{Category, NewCategory};
use bookstore_types::domain::page::Page;
use bookstore_types::ports::Store;

use super::{no_content, parse_id, AppState, PageParams};
use crate::errors::AppError;
use crate::inbound::http::auth::{AdminUser, CurrentUser};

pub async fn list_categories<R: Store>(
    State(services): State<AppState<R>>,
    _user: CurrentUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Category>>, AppError> {
    Ok(Json(services.categories.list_categories(page.into()).await?))
}

pub async fn get_category<R: Store>(
    State(services): State<AppState<R>>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(services.categories.get_category(parse_id(&id)?).await?))
}

pub async fn books_in_category<R: Store>(
    State(services): State<AppState<R>>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Book>>, AppError> {
    let books = services
        .books
        .books_by_category(parse_id(&id)?, page.into())
        .await?;
    Ok(Json(books))
}

pub async fn create_category<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Json(payload): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = services.categories.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<NewCategory>,
) -> Result<Json<Category>, AppError> {
    let category = services
        .categories
        .update_category(parse_id(&id)?, payload)
        .await?;
    Ok(Json(category))
}

pub async fn delete_category<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    services.categories.delete_category(parse_id(&id)?).await?;
    Ok(no_content())
}
