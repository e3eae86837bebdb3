pub mod books;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod users;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use bookstore_types::domain::page::{PageRequest, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::Services;
use crate::errors::AppError;

pub type AppState<R> = Arc<Services<R>>;

/// `?page=&size=`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl From<PageParams> for PageRequest {
    fn from(p: PageParams) -> Self {
        PageRequest::new(p.page.unwrap_or(0), p.size.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|e| AppError::BadRequest(format!("invalid id {raw}: {e}")))
}

pub(crate) fn no_content() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NO_CONTENT, Json(serde_json::json!({})))
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_default_and_clamp() {
        let req: PageRequest = PageParams::default().into();
        assert_eq!(req, PageRequest::new(0, DEFAULT_PAGE_SIZE));

        let req: PageRequest = PageParams {
            page: Some(2),
            size: Some(10_000),
        }
        .into();
        assert_eq!(req.page, 2);
        assert_eq!(req.size, bookstore_types::domain::page::MAX_PAGE_SIZE);
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        assert!(matches!(parse_id("nope"), Err(AppError::BadRequest(_))));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
