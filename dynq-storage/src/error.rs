use dynq_catalog::error::{Error as CatalogError, ErrorKind};
use dynq_datatype::ScalarType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("null value in column {column} of {table} violates not-null constraint")]
    NotNullViolation { table: String, column: String },
    #[error("duplicate key {key} in {table}")]
    DuplicateKey { table: String, key: String },
    #[error("value {value} does not fit column {column} of type {expected}")]
    TypeMismatch {
        column: String,
        value: String,
        expected: ScalarType,
    },
    #[error("record not found, no row of {table} has key {key}")]
    RecordNotFound { table: String, key: String },
    #[error("no records match in {0}")]
    NoRecordsMatch(String),
}

impl Error {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Catalog(e) => e.kind(),
            Error::InvalidConfig(_) => ErrorKind::Schema,
            Error::NotNullViolation { .. }
            | Error::DuplicateKey { .. }
            | Error::TypeMismatch { .. } => ErrorKind::Execution,
            Error::RecordNotFound { .. } | Error::NoRecordsMatch(_) => ErrorKind::NotFound,
        }
    }

    #[inline]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Catalog(e) => e.field(),
            Error::NotNullViolation { column, .. } | Error::TypeMismatch { column, .. } => {
                Some(column)
            }
            _ => None,
        }
    }
}
