use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Category of a failed request, shared by all crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown database, table or column.
    Schema,
    /// Malformed request content detected before touching the store.
    Validation,
    /// Write record does not conform to its derived schema.
    WriteValidation,
    /// Nothing matched the requested records.
    NotFound,
    /// The store rejected a statement.
    Execution,
}

impl ErrorKind {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::WriteValidation => "WriteValidationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Execution => "ExecutionError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("database {0} not found")]
    DatabaseNotFound(String),
    #[error("database {0} already registered")]
    DatabaseAlreadyExists(String),
    #[error("table {table} not found in database {db}")]
    TableNotFound { db: String, table: String },
    #[error("table {0} not found in any database")]
    TableNotFoundInAnyDatabase(String),
    #[error("table {0} already exists")]
    TableAlreadyExists(String),
    #[error("column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    #[error("duplicate column {0}")]
    DuplicateColumn(String),
    #[error("invalid column {column}: {reason}")]
    InvalidColumn { column: String, reason: &'static str },
    #[error("table {0} has no primary key")]
    NoPrimaryKey(String),
    #[error("invalid field reference '{0}', expected 'table.column' or 'db.table.column'")]
    InvalidFieldRef(String),
}

impl Error {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidFieldRef(_) => ErrorKind::Validation,
            _ => ErrorKind::Schema,
        }
    }

    /// Offending field path, if the error is about a single field.
    #[inline]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::ColumnNotFound { column, .. }
            | Error::DuplicateColumn(column)
            | Error::InvalidColumn { column, .. } => Some(column),
            Error::InvalidFieldRef(field) => Some(field),
            _ => None,
        }
    }
}
