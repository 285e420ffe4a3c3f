use crate::table::Table;
use dynq_catalog::error::{Error as CatalogError, Result as CatalogResult};
use dynq_catalog::{Catalog, TableDescriptor, TableSpec};
use indexmap::IndexMap;
use parking_lot::RwLock;
use semistr::SemiStr;
use std::sync::Arc;

pub type TableRef = Arc<RwLock<Table>>;

/// One logical database holding live tables.
///
/// Its catalog view always reflects the tables currently present.
pub struct Database {
    name: SemiStr,
    tables: RwLock<IndexMap<SemiStr, TableRef>>,
}

impl Database {
    #[inline]
    pub fn new(name: &str) -> Self {
        Database {
            name: SemiStr::new(name),
            tables: RwLock::new(IndexMap::new()),
        }
    }

    #[inline]
    pub fn table(&self, table_name: &str) -> CatalogResult<TableRef> {
        self.tables
            .read()
            .get(table_name)
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound {
                db: self.name.as_str().to_string(),
                table: table_name.to_string(),
            })
    }
}

impl Catalog for Database {
    #[inline]
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn create_table(&self, table_spec: TableSpec) -> CatalogResult<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(table_spec.table_name.as_str()) {
            return Err(CatalogError::TableAlreadyExists(
                table_spec.table_name.as_str().to_string(),
            ));
        }
        let desc = TableDescriptor::from_spec(self.name.as_str(), table_spec)?;
        log::debug!("created table {}", desc.qualified_name());
        tables.insert(desc.name.clone(), Arc::new(RwLock::new(Table::new(desc))));
        Ok(())
    }

    fn drop_table(&self, table_name: &str) -> CatalogResult<()> {
        match self.tables.write().shift_remove(table_name) {
            Some(_) => Ok(()),
            None => Err(CatalogError::TableNotFound {
                db: self.name.as_str().to_string(),
                table: table_name.to_string(),
            }),
        }
    }

    #[inline]
    fn all_tables(&self) -> Vec<SemiStr> {
        self.tables.read().keys().cloned().collect()
    }

    #[inline]
    fn exists_table(&self, table_name: &str) -> bool {
        self.tables.read().contains_key(table_name)
    }

    #[inline]
    fn describe(&self, table_name: &str) -> Option<TableDescriptor> {
        let tables = self.tables.read();
        tables.get(table_name).map(|t| t.read().desc.clone())
    }
}
