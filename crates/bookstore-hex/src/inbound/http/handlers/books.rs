use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_types::domain::book::{Book, NewBook};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::domain::search::BookSearchParameters;
use bookstore_types::ports::Store;

use super::{no_content, parse_id, AppState, PageParams};
use crate::errors::AppError;
use crate::inbound::http::auth::{AdminUser, CurrentUser};

pub async fn list_books<R: Store>(
    State(services): State<AppState<R>>,
    _user: CurrentUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Book>>, AppError> {
    Ok(Json(services.books.list_books(page.into()).await?))
}

pub async fn get_book<R: Store>(
    State(services): State<AppState<R>>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(services.books.get_book(parse_id(&id)?).await?))
}

pub async fn create_book<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Json(payload): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = services.books.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update_book<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<NewBook>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(services.books.update_book(parse_id(&id)?, payload).await?))
}

pub async fn delete_book<R: Store>(
    State(services): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    services.books.delete_book(parse_id(&id)?).await?;
    Ok(no_content())
}

/// `GET /books/search?author=king,tolkien&title=the&page=0&size=20`
pub async fn search_books<R: Store>(
    State(services): State<AppState<R>>,
    _user: CurrentUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Book>>, AppError> {
    let (params, page) = search_request(pairs)?;
    Ok(Json(services.books.search_books(&params, page).await?))
}

/// Splits a raw query into filter parameters and the reserved paging keys.
fn search_request(
    pairs: Vec<(String, String)>,
) -> Result<(BookSearchParameters, PageRequest), AppError> {
    let mut params = BookSearchParameters::new();
    let mut page = PageParams::default();
    for (key, value) in pairs {
        match key.as_str() {
            "page" => page.page = Some(number(&key, &value)?),
            "size" => page.size = Some(number(&key, &value)?),
            _ => params.push(&key, &value),
        }
    }
    Ok((params, page.into()))
}

fn number(key: &str, value: &str) -> Result<u32, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{key} must be a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_and_comma_separated_values_merge() {
        let (params, page) = search_request(pairs(&[
            ("author", "king, tolkien"),
            ("author", "herbert"),
            ("title", ""),
            ("page", "1"),
            ("size", "5"),
        ]))
        .unwrap();
        assert_eq!(
            params.filters["author"],
            ["king", "tolkien", "herbert"]
        );
        assert!(params.filters["title"].is_empty());
        assert!(!params.filters.contains_key("page"));
        assert_eq!(page, PageRequest::new(1, 5));
    }

    #[test]
    fn bad_paging_values_rejected() {
        let res = search_request(pairs(&[("page", "-1")]));
        assert!(matches!(res, Err(AppError::BadRequest(_))));
    }
}
