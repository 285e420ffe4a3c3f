use crate::filter::Operator;
use dynq_catalog::error::{Error as CatalogError, ErrorKind};
use dynq_datatype::ScalarType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid name in filters, {field} is not a column of {table}")]
    UnknownField { table: String, field: String },
    #[error("filter on {0} must have at least one value")]
    EmptyValues(String),
    #[error("multiple values not supported for operator '{operator}' on {field}")]
    MultipleValues { field: String, operator: Operator },
    #[error("invalid value for filter: [{field}={value}], expected {expected}")]
    TypeMismatch {
        field: String,
        value: String,
        expected: ScalarType,
    },
}

impl Error {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Catalog(e) => e.kind(),
            Error::UnknownField { .. } => ErrorKind::Schema,
            Error::EmptyValues(_) | Error::MultipleValues { .. } | Error::TypeMismatch { .. } => {
                ErrorKind::Validation
            }
        }
    }

    #[inline]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Catalog(e) => e.field(),
            Error::UnknownField { field, .. }
            | Error::EmptyValues(field)
            | Error::MultipleValues { field, .. }
            | Error::TypeMismatch { field, .. } => Some(field),
        }
    }
}
