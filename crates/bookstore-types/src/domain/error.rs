/// Input rejected before any storage call is made.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::domain::ValidationError(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure;

pub(crate) const MAX_TEXT_LEN: usize = 255;

/// Non-blank, at most 255 chars. Returns the trimmed value.
pub(crate) fn required_text(field: &str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    ensure!(!trimmed.is_empty(), "{field} cannot be empty");
    ensure!(
        trimmed.chars().count() <= MAX_TEXT_LEN,
        "{field} must be at most {MAX_TEXT_LEN} characters"
    );
    Ok(trimmed.to_string())
}

/// Blank collapses to `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            ensure!(
                v.chars().count() <= MAX_TEXT_LEN,
                "{field} must be at most {MAX_TEXT_LEN} characters"
            );
            Ok(Some(v.to_string()))
        }
    }
}
