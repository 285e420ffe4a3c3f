use crate::error::{Error, Result};
use crate::{Catalog, Column, TableDescriptor};
use indexmap::IndexMap;
use semistr::SemiStr;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of all logical databases, keyed by name in registration order.
///
/// The registry is built once at startup and only read afterwards.
/// Lookups never change registered catalogs.
#[derive(Clone, Default)]
pub struct CatalogRegistry {
    catalogs: IndexMap<SemiStr, Arc<dyn Catalog>>,
}

impl CatalogRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn register(&mut self, catalog: Arc<dyn Catalog>) -> Result<()> {
        let name = catalog.name();
        if self.catalogs.contains_key(name) {
            return Err(Error::DatabaseAlreadyExists(name.to_string()));
        }
        self.catalogs.insert(SemiStr::new(name), catalog);
        Ok(())
    }

    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(|k| k.as_str())
    }

    #[inline]
    pub fn catalog(&self, db: &str) -> Option<&Arc<dyn Catalog>> {
        self.catalogs.get(db)
    }

    /// Resolve live structure of a table.
    pub fn resolve(&self, db: &str, table: &str) -> Result<TableDescriptor> {
        let catalog = self
            .catalogs
            .get(db)
            .ok_or_else(|| Error::DatabaseNotFound(db.to_string()))?;
        catalog.describe(table).ok_or_else(|| Error::TableNotFound {
            db: db.to_string(),
            table: table.to_string(),
        })
    }

    /// Returns name of the first registered database containing given table.
    #[inline]
    pub fn locate_table(&self, table: &str) -> Option<&str> {
        self.catalogs
            .iter()
            .find(|(_, catalog)| catalog.exists_table(table))
            .map(|(name, _)| name.as_str())
    }

    /// Resolve a field reference in form of `db.table.column` or `table.column`.
    #[inline]
    pub fn resolve_field(&self, field_ref: &str) -> Result<ResolvedField> {
        let fr = FieldRef::parse(field_ref)?;
        let table = match fr.db {
            Some(db) => self.resolve(db, fr.table)?,
            None => {
                let db = self
                    .locate_table(fr.table)
                    .ok_or_else(|| Error::TableNotFoundInAnyDatabase(fr.table.to_string()))?;
                self.resolve(db, fr.table)?
            }
        };
        ResolvedField::new(table, fr.column)
    }
}

/// Parsed field reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub db: Option<&'a str>,
    pub table: &'a str,
    pub column: &'a str,
}

impl<'a> FieldRef<'a> {
    #[inline]
    pub fn parse(field_ref: &'a str) -> Result<Self> {
        let parts: Vec<&str> = field_ref.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidFieldRef(field_ref.to_string()));
        }
        match parts.as_slice() {
            [db, table, column] => Ok(FieldRef {
                db: Some(*db),
                table: *table,
                column: *column,
            }),
            [table, column] => Ok(FieldRef {
                db: None,
                table: *table,
                column: *column,
            }),
            _ => Err(Error::InvalidFieldRef(field_ref.to_string())),
        }
    }
}

/// A column together with the table owning it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub table: TableDescriptor,
    pub column: Column,
}

impl ResolvedField {
    #[inline]
    pub fn new(table: TableDescriptor, column_name: &str) -> Result<Self> {
        let column = table.expect_column(column_name)?.clone();
        Ok(ResolvedField { table, column })
    }
}

/// Per-request memo of resolved tables.
///
/// It must not outlive a single request so every request observes
/// the live structure.
pub struct TableCache<'a> {
    registry: &'a CatalogRegistry,
    map: HashMap<(SemiStr, SemiStr), TableDescriptor>,
}

impl<'a> TableCache<'a> {
    #[inline]
    pub fn new(registry: &'a CatalogRegistry) -> Self {
        TableCache {
            registry,
            map: HashMap::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a CatalogRegistry {
        self.registry
    }

    #[inline]
    pub fn resolve(&mut self, db: &str, table: &str) -> Result<&TableDescriptor> {
        let key = (SemiStr::new(db), SemiStr::new(table));
        if !self.map.contains_key(&key) {
            let desc = self.registry.resolve(db, table)?;
            self.map.insert(key.clone(), desc);
        }
        Ok(&self.map[&key])
    }

    #[inline]
    pub fn resolve_field(&mut self, field_ref: &str) -> Result<ResolvedField> {
        let fr = FieldRef::parse(field_ref)?;
        let registry = self.registry;
        let db = match fr.db {
            Some(db) => db,
            None => registry
                .locate_table(fr.table)
                .ok_or_else(|| Error::TableNotFoundInAnyDatabase(fr.table.to_string()))?,
        };
        let table = self.resolve(db, fr.table)?.clone();
        ResolvedField::new(table, fr.column)
    }
}
