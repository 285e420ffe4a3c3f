use dynq_datatype::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a filter item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    In,
    Not,
    Gt,
    Lt,
    Like,
    ILike,
}

impl Operator {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::In => "in",
            Operator::Not => "not",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Like => "like",
            Operator::ILike => "ilike",
        }
    }

    /// Only `in` accepts more than one value.
    #[inline]
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Operator::In)
    }
}

impl fmt::Display for Operator {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a filter item is joined with the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

/// One predicate clause of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterItem {
    pub operator: Operator,
    pub field: String,
    pub values: Vec<Value>,
    #[serde(default)]
    pub join_to_next: LogicalOp,
}

impl FilterItem {
    #[inline]
    pub fn new(operator: Operator, field: &str, values: Vec<Value>) -> Self {
        FilterItem {
            operator,
            field: field.to_string(),
            values,
            join_to_next: LogicalOp::And,
        }
    }

    #[inline]
    pub fn or_next(mut self) -> Self {
        self.join_to_next = LogicalOp::Or;
        self
    }
}
