use thiserror::Error;

use crate::domain::LabelKind;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
    #[error("Unknown label: {0}")]
    UnknownLabel(String),
    #[error("Label '{label}' is not a {expected} label")]
    WrongLabelKind { label: String, expected: LabelKind },
}
