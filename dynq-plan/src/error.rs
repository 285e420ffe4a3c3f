use dynq_catalog::error::{Error as CatalogError, ErrorKind};
use dynq_datatype::ScalarType;
use dynq_expr::error::Error as ExprError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error("page number must be at least 1, got {0}")]
    PageNumberOutOfRange(i64),
    #[error("page size must be between 1 and 100, got {0}")]
    PageSizeOutOfRange(i64),
    #[error("fields must not be empty")]
    EmptyProjection,
    #[error("invalid field in fields, {0}")]
    UnknownField(String),
    #[error("invalid field for sort, {0}")]
    UnknownSortField(String),
    #[error("join reference {0} does not belong to a table already in the query")]
    JoinOutsideQuery(String),
    #[error("table {0} is already part of the query")]
    DuplicateJoinTable(String),
    #[error("cannot join {left} ({left_ty}) with {right} ({right_ty})")]
    JoinTypeMismatch {
        left: String,
        left_ty: ScalarType,
        right: String,
        right_ty: ScalarType,
    },
    #[error("only one record may be updated at a time")]
    MultipleUpdateItems,
    #[error("a record is required for update")]
    MissingUpdateItem,
    #[error("table {0} has no single-column primary key to update by")]
    NoSingleKey(String),
    #[error("invalid record id {value}, expected {expected}")]
    RecIdTypeMismatch { value: String, expected: ScalarType },
    #[error("item {item}: unknown field {field}")]
    UnknownWriteField { item: usize, field: String },
    #[error("item {item}: field {field} is required")]
    MissingField { item: usize, field: String },
    #[error("item {item}: invalid value {value} for field {field}, expected {expected}")]
    WriteTypeMismatch {
        item: usize,
        field: String,
        value: String,
        expected: ScalarType,
    },
    #[error("item {item}: field {field} cannot be null")]
    NullNotAllowed { item: usize, field: String },
    #[error("item {item}: field {field} exceeds max length {max_len}")]
    TooLong {
        item: usize,
        field: String,
        max_len: u32,
    },
}

impl Error {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Catalog(e) => e.kind(),
            Error::Expr(e) => e.kind(),
            Error::UnknownField(_) | Error::UnknownSortField(_) | Error::NoSingleKey(_) => {
                ErrorKind::Schema
            }
            Error::PageNumberOutOfRange(_)
            | Error::PageSizeOutOfRange(_)
            | Error::EmptyProjection
            | Error::JoinOutsideQuery(_)
            | Error::DuplicateJoinTable(_)
            | Error::JoinTypeMismatch { .. }
            | Error::MultipleUpdateItems
            | Error::MissingUpdateItem
            | Error::RecIdTypeMismatch { .. } => ErrorKind::Validation,
            Error::UnknownWriteField { .. }
            | Error::MissingField { .. }
            | Error::WriteTypeMismatch { .. }
            | Error::NullNotAllowed { .. }
            | Error::TooLong { .. } => ErrorKind::WriteValidation,
        }
    }

    /// Offending field path, if the error is about a single field.
    #[inline]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Catalog(e) => e.field(),
            Error::Expr(e) => e.field(),
            Error::UnknownField(field)
            | Error::UnknownSortField(field)
            | Error::JoinOutsideQuery(field) => Some(field),
            Error::JoinTypeMismatch { right, .. } => Some(right),
            Error::UnknownWriteField { field, .. }
            | Error::MissingField { field, .. }
            | Error::WriteTypeMismatch { field, .. }
            | Error::NullNotAllowed { field, .. }
            | Error::TooLong { field, .. } => Some(field),
            _ => None,
        }
    }
}
