use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bookstore_types::domain::user::{NewUser, User};
use bookstore_types::ports::Store;

use super::AppState;
use crate::errors::AppError;

pub async fn register<R: Store>(
    State(services): State<AppState<R>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = services.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
