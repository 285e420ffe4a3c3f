pub mod error;
pub mod mem_impl;
pub mod registry;
pub mod spec;

use crate::error::Result;
use bitflags::bitflags;
use dynq_datatype::{ScalarType, Value};
use semistr::SemiStr;

pub use registry::*;
pub use spec::*;

/// Catalog maintains live structure of all tables in one logical database.
/// It could be shared between threads.
pub trait Catalog: Send + Sync {
    /// Name under which the catalog is registered.
    fn name(&self) -> &str;

    fn create_table(&self, table_spec: TableSpec) -> Result<()>;

    fn drop_table(&self, table_name: &str) -> Result<()>;

    fn all_tables(&self) -> Vec<SemiStr>;

    fn exists_table(&self, table_name: &str) -> bool;

    /// Returns current structure of given table.
    /// Each call returns an independent copy.
    fn describe(&self, table_name: &str) -> Option<TableDescriptor>;
}

/// Live structure of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub db: SemiStr,
    pub name: SemiStr,
    pub columns: Vec<Column>,
    pub primary_key: Vec<ColIndex>,
}

impl TableDescriptor {
    /// Build descriptor of a new table.
    /// Column names must be unique and auto-increment is only
    /// allowed on a single integer primary key column.
    pub fn from_spec(db: &str, table_spec: TableSpec) -> Result<Self> {
        let mut columns: Vec<Column> = Vec::with_capacity(table_spec.columns.len());
        let mut primary_key = vec![];
        for (i, c) in table_spec.columns.into_iter().enumerate() {
            if columns.iter().any(|col| col.name.as_str() == c.column_name.as_str()) {
                return Err(error::Error::DuplicateColumn(c.column_name.as_str().to_string()));
            }
            let mut attr = c.column_attributes;
            attr.set(ColumnAttributes::HAS_DEFAULT, c.default.is_some());
            if attr.contains(ColumnAttributes::AUTO_INCREMENT)
                && (c.column_type != ScalarType::Int
                    || !attr.contains(ColumnAttributes::PRIMARY_KEY))
            {
                return Err(error::Error::InvalidColumn {
                    column: c.column_name.as_str().to_string(),
                    reason: "auto increment requires integer primary key",
                });
            }
            if let Some(default) = c.default.as_ref() {
                if !default.is_null() && !c.column_type.matches(default) {
                    return Err(error::Error::InvalidColumn {
                        column: c.column_name.as_str().to_string(),
                        reason: "default value does not match column type",
                    });
                }
            }
            let idx = ColIndex::from(i as u32);
            if attr.contains(ColumnAttributes::PRIMARY_KEY) {
                primary_key.push(idx);
            }
            columns.push(Column {
                name: c.column_name,
                ty: c.column_type,
                idx,
                attr,
                default: c.default,
                max_len: c.max_len,
            });
        }
        if primary_key.len() > 1
            && columns
                .iter()
                .any(|c| c.attr.contains(ColumnAttributes::AUTO_INCREMENT))
        {
            return Err(error::Error::InvalidColumn {
                column: table_spec.table_name.as_str().to_string(),
                reason: "auto increment requires single-column primary key",
            });
        }
        Ok(TableDescriptor {
            db: SemiStr::new(db),
            name: table_spec.table_name,
            columns,
            primary_key,
        })
    }

    #[inline]
    pub fn column(&self, column_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.as_str() == column_name)
    }

    #[inline]
    pub fn column_at(&self, idx: ColIndex) -> &Column {
        &self.columns[idx.value() as usize]
    }

    /// Returns column with given name, or a schema error.
    #[inline]
    pub fn expect_column(&self, column_name: &str) -> Result<&Column> {
        self.column(column_name)
            .ok_or_else(|| error::Error::ColumnNotFound {
                table: self.qualified_name(),
                column: column_name.to_string(),
            })
    }

    #[inline]
    pub fn pk_columns(&self) -> impl Iterator<Item = &Column> {
        self.primary_key.iter().map(|idx| self.column_at(*idx))
    }

    /// Returns the only primary key column, or None if the key
    /// is missing or composite.
    #[inline]
    pub fn single_pk(&self) -> Option<&Column> {
        match self.primary_key.as_slice() {
            [idx] => Some(self.column_at(*idx)),
            _ => None,
        }
    }

    #[inline]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.db.as_str(), self.name.as_str())
    }

    /// Returns whether this descriptor describes the table with given names.
    #[inline]
    pub fn is(&self, db: &str, table: &str) -> bool {
        self.db.as_str() == db && self.name.as_str() == table
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: SemiStr,
    pub ty: ScalarType,
    pub idx: ColIndex,
    pub attr: ColumnAttributes,
    // literal default value, if any.
    pub default: Option<Value>,
    // maximum length of string column.
    pub max_len: Option<u32>,
}

impl Column {
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.attr.contains(ColumnAttributes::NULLABLE)
    }

    #[inline]
    pub fn is_primary_key(&self) -> bool {
        self.attr.contains(ColumnAttributes::PRIMARY_KEY)
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.attr.contains(ColumnAttributes::HAS_DEFAULT)
    }

    #[inline]
    pub fn is_auto_increment(&self) -> bool {
        self.attr.contains(ColumnAttributes::AUTO_INCREMENT)
    }
}

/// ColIndex wraps u32 to be the index of column in current table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColIndex(u32);

impl ColIndex {
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ColIndex {
    fn from(src: u32) -> Self {
        ColIndex(src)
    }
}

impl std::fmt::Display for ColIndex {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

bitflags! {
    pub struct ColumnAttributes: u32 {
        // whether value can be null.
        const NULLABLE = 0x01;
        // whether it belongs to primary key.
        const PRIMARY_KEY = 0x02;
        // whether the store supplies a default value.
        const HAS_DEFAULT = 0x04;
        // whether the store generates value on insert.
        const AUTO_INCREMENT = 0x08;
    }
}
