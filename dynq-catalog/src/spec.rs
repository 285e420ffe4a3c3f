use crate::ColumnAttributes;
use dynq_datatype::{ScalarType, Value};
use semistr::SemiStr;

#[derive(Debug)]
pub struct TableSpec {
    pub table_name: SemiStr,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    #[inline]
    pub fn new(table_name: &str, columns: Vec<ColumnSpec>) -> Self {
        TableSpec {
            table_name: SemiStr::new(table_name),
            columns,
        }
    }
}

#[derive(Debug)]
pub struct ColumnSpec {
    pub column_name: SemiStr,
    pub column_type: ScalarType,
    pub column_attributes: ColumnAttributes,
    pub default: Option<Value>,
    pub max_len: Option<u32>,
}

impl ColumnSpec {
    #[inline]
    pub fn new(
        column_name: &str,
        column_type: ScalarType,
        column_attributes: ColumnAttributes,
    ) -> Self {
        ColumnSpec {
            column_name: SemiStr::new(column_name),
            column_type,
            column_attributes,
            default: None,
            max_len: None,
        }
    }

    /// Literal default applied by the store when value is absent.
    #[inline]
    pub fn default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[inline]
    pub fn max_len(mut self, max_len: u32) -> Self {
        self.max_len = Some(max_len);
        self
    }
}
