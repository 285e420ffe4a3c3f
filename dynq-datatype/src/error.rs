use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unsupported value {0}, expected a scalar")]
    UnsupportedValue(String),
    #[error("integer {0} out of range")]
    IntegerOutOfRange(String),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
