pub mod error;
mod ty;
mod value;

pub use ty::ScalarType;
pub use value::Value;
