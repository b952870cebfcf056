use thiserror::Error;

use crate::validate::FieldError;

/// Domain errors for board operations. Commands surface these through
/// `anyhow` at the CLI boundary.
#[derive(Error, Debug)]
pub enum BoardError {
    /// The referenced post or answer no longer exists.
    #[error("not found")]
    NotFound,

    /// The requester's name does not match the stored author.
    #[error("only the author can modify this")]
    NotOwner,

    /// One or more submitted fields failed validation. Every violated field
    /// is reported, not just the first.
    #[error("{}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// One line per violated field, so every problem surfaces at once.
fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field.as_str(), e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, BoardError>;

impl BoardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BoardError::NotFound)
    }

    pub fn is_not_owner(&self) -> bool {
        matches!(self, BoardError::NotOwner)
    }
}
