use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{optional_text, required_text};
use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Category {
    pub fn new(input: NewCategory) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required_text("name", input.name)?,
            description: optional_text("description", input.description)?,
            deleted: false,
        })
    }

    pub fn apply(&mut self, input: NewCategory) -> Result<(), ValidationError> {
        self.name = required_text("name", input.name)?;
        self.description = optional_text("description", input.description)?;
        Ok(())
    }
}
