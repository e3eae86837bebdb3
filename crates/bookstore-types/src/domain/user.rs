use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ensure, optional_text, required_text};
use super::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

impl User {
    /// Registered users always start with [`Role::User`].
    pub fn new(input: NewUser) -> Result<Self, ValidationError> {
        let email = required_text("email", input.email)?.to_lowercase();
        ensure!(email.contains('@'), "invalid email");
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            first_name: required_text("first_name", input.first_name)?,
            last_name: required_text("last_name", input.last_name)?,
            shipping_address: optional_text("shipping_address", input.shipping_address)?,
            role: Role::User,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
