use dynq_catalog::error::ErrorKind;
use dynq_plan::error::Error as PlanError;
use dynq_storage::error::Error as StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Only {max} records allowed at a time.")]
    BatchTooLarge { size: usize, max: usize },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown operation {0}")]
    UnknownOperation(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Plan(e) => e.kind(),
            Error::Storage(e) => e.kind(),
            Error::BatchTooLarge { .. } | Error::InvalidRequest(_) | Error::UnknownOperation(_) => {
                ErrorKind::Validation
            }
            Error::InvalidConfig(_) => ErrorKind::Schema,
        }
    }

    #[inline]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Plan(e) => e.field(),
            Error::Storage(e) => e.field(),
            _ => None,
        }
    }
}
