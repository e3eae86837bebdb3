use std::sync::Arc;

use crate::errors::AppError;
use bookstore_types::domain::user::{NewUser, Role, User};
use bookstore_types::ports::user_repository::UserRepository;
use bookstore_types::ports::RepoError;
use uuid::Uuid;

pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn register(&self, input: NewUser) -> Result<User, AppError> {
        let user = User::new(input)?;
        let user = self.repo.save_user(user).await.map_err(|e| match e {
            RepoError::Conflict(_) => AppError::Conflict("email is already registered".into()),
            other => other.into(),
        })?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Resolves the caller of a request; unknown ids are `Unauthorized`.
    pub async fn authenticate(&self, id: Uuid) -> Result<User, AppError> {
        self.repo
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(format!("unknown user {id}")))
    }

    /// Promotes the account with this email to admin, registering a bare
    /// account first when none exists.
    pub async fn ensure_admin(&self, email: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        let mut user = match self.repo.find_user_by_email(&email).await? {
            Some(user) => user,
            None => User::new(NewUser {
                email: email.clone(),
                first_name: "Admin".into(),
                last_name: "Admin".into(),
                shipping_address: None,
            })?,
        };
        if user.is_admin() {
            return Ok(user);
        }
        user.role = Role::Admin;
        let user = self.repo.save_user(user).await?;
        tracing::info!(user_id = %user.id, %email, "admin account ready");
        Ok(user)
    }
}
