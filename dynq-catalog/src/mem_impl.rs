use crate::error::{Error, Result};
use crate::{Catalog, TableDescriptor, TableSpec};
use indexmap::IndexMap;
use parking_lot::RwLock;
use semistr::SemiStr;

/// Catalog that keeps table structures in memory only.
#[derive(Debug)]
pub struct MemCatalog {
    name: SemiStr,
    inner: RwLock<Inner>,
}

impl MemCatalog {
    #[inline]
    pub fn new(name: &str) -> Self {
        MemCatalog {
            name: SemiStr::new(name),
            inner: RwLock::new(Inner::default()),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: IndexMap<SemiStr, TableDescriptor>,
}

impl Inner {
    #[inline]
    fn create_table(&mut self, db: &str, table_spec: TableSpec) -> Result<()> {
        if self.tables.contains_key(table_spec.table_name.as_str()) {
            return Err(Error::TableAlreadyExists(
                table_spec.table_name.as_str().to_string(),
            ));
        }
        let desc = TableDescriptor::from_spec(db, table_spec)?;
        self.tables.insert(desc.name.clone(), desc);
        Ok(())
    }

    #[inline]
    fn drop_table(&mut self, db: &str, table_name: &str) -> Result<()> {
        match self.tables.shift_remove(table_name) {
            Some(_) => Ok(()),
            None => Err(Error::TableNotFound {
                db: db.to_string(),
                table: table_name.to_string(),
            }),
        }
    }
}

impl Catalog for MemCatalog {
    #[inline]
    fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    fn create_table(&self, table_spec: TableSpec) -> Result<()> {
        let mut inner = self.inner.write();
        inner.create_table(self.name.as_str(), table_spec)
    }

    #[inline]
    fn drop_table(&self, table_name: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.drop_table(self.name.as_str(), table_name)
    }

    #[inline]
    fn all_tables(&self) -> Vec<SemiStr> {
        let inner = self.inner.read();
        inner.tables.keys().cloned().collect()
    }

    #[inline]
    fn exists_table(&self, table_name: &str) -> bool {
        let inner = self.inner.read();
        inner.tables.contains_key(table_name)
    }

    #[inline]
    fn describe(&self, table_name: &str) -> Option<TableDescriptor> {
        let inner = self.inner.read();
        inner.tables.get(table_name).cloned()
    }
}
