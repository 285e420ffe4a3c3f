use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native scalar type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    Str,
    Date,
}

impl ScalarType {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::Str => "str",
            ScalarType::Date => "date",
        }
    }

    /// Returns whether runtime type of the value is exactly this type.
    /// Null never matches.
    #[inline]
    pub fn matches(self, val: &Value) -> bool {
        val.scalar_type() == Some(self)
    }
}

impl fmt::Display for ScalarType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
