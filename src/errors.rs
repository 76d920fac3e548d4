use thiserror::Error;
use uuid::Uuid;

use crate::catalog::CatalogError;

/// Error type that captures common formset failures.
#[derive(Debug, Error)]
pub enum FormsetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("at least {required} participant(s) required")]
    MinimumViolation { required: usize },
    #[error("entry schema has no fields to build entries from")]
    MissingTemplate,
    #[error("unknown entry: {0}")]
    UnknownEntry(Uuid),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type FormsetResult<T> = Result<T, FormsetError>;
