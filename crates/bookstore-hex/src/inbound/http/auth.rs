use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bookstore_types::domain::user::User;
use bookstore_types::ports::Store;
use uuid::Uuid;

use crate::application::Services;
use crate::errors::AppError;

/// Header carrying the id of the registered user making the request.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The registered user behind a request.
pub struct CurrentUser(pub User);

/// A [`CurrentUser`] that also holds the admin role.
pub struct AdminUser(pub User);

impl<R: Store> FromRequestParts<Arc<Services<R>>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<Services<R>>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;
        let user = state.users.authenticate(id).await?;
        tracing::debug!(user_id = %user.id, "authenticated");
        Ok(CurrentUser(user))
    }
}

impl<R: Store> FromRequestParts<Arc<Services<R>>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<Services<R>>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("admin role required".into()));
        }
        Ok(AdminUser(user))
    }
}
