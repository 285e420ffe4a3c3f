//! In-memory storage engine of DynQ.
//!
//! The engine owns all databases and the catalog registry built from
//! them. Reads run on table snapshots, writes are serialized by a
//! single writer latch.
use crate::database::{Database, TableRef};
use crate::error::Result;
use crate::session::Session;
use dynq_catalog::{Catalog, CatalogRegistry};
use indexmap::IndexMap;
use parking_lot::Mutex;
use semistr::SemiStr;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type TrxID = u64;

/// Storage engine, cheap to clone and share between threads.
#[derive(Clone)]
pub struct Engine(Arc<EngineInner>);

impl Deref for Engine {
    type Target = EngineInner;
    #[inline]
    fn deref(&self) -> &EngineInner {
        &self.0
    }
}

impl Engine {
    /// Register given databases in order.
    pub fn new(databases: Vec<Database>) -> Result<Self> {
        let mut registry = CatalogRegistry::new();
        let mut dbs = IndexMap::with_capacity(databases.len());
        for db in databases {
            let db = Arc::new(db);
            registry.register(Arc::clone(&db) as Arc<dyn Catalog>)?;
            dbs.insert(SemiStr::new(db.name()), db);
        }
        Ok(Engine(Arc::new(EngineInner {
            registry,
            databases: dbs,
            writer: Mutex::new(()),
            next_trx_id: AtomicU64::new(1),
        })))
    }

    #[inline]
    pub fn new_session(&self) -> Session {
        Session::new(self.clone())
    }
}

pub struct EngineInner {
    registry: CatalogRegistry,
    databases: IndexMap<SemiStr, Arc<Database>>,
    // only one write transaction runs at a time.
    pub(crate) writer: Mutex<()>,
    next_trx_id: AtomicU64,
}

impl EngineInner {
    #[inline]
    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    #[inline]
    pub fn database(&self, name: &str) -> Option<&Arc<Database>> {
        self.databases.get(name)
    }

    /// Returns live table by database and table name.
    #[inline]
    pub fn table(&self, db: &str, table: &str) -> Result<TableRef> {
        let database = self
            .database(db)
            .ok_or_else(|| dynq_catalog::error::Error::DatabaseNotFound(db.to_string()))?;
        Ok(database.table(table)?)
    }

    #[inline]
    pub(crate) fn next_trx_id(&self) -> TrxID {
        self.next_trx_id.fetch_add(1, Ordering::Relaxed)
    }
}
