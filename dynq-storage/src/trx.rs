use crate::engine::{Engine, TrxID};
use crate::error::{Error, Result};
use crate::session::execute_select;
use crate::table::{Row, format_key};
use dynq_plan::{DeletePlan, InsertStmt, RowKey, SelectPlan, UpdateStmt, WriteStmt};
use parking_lot::MutexGuard;
use semistr::SemiStr;

/// Reverse action of one applied change.
#[derive(Debug)]
enum UndoKind {
    // row inserted at position.
    Insert(usize),
    // row at position was overwritten.
    Update(usize, Row),
    // row removed from position.
    Delete(usize, Row),
}

#[derive(Debug)]
struct UndoEntry {
    db: SemiStr,
    table: SemiStr,
    kind: UndoKind,
}

/// Write transaction.
///
/// Changes are applied immediately and undone in reverse order on
/// rollback. Dropping an unfinished transaction rolls it back.
pub struct ActiveTrx<'a> {
    engine: &'a Engine,
    trx_id: TrxID,
    undo: Vec<UndoEntry>,
    _writer: MutexGuard<'a, ()>,
}

impl<'a> ActiveTrx<'a> {
    #[inline]
    pub(crate) fn new(engine: &'a Engine) -> Self {
        let writer = engine.writer.lock();
        ActiveTrx {
            engine,
            trx_id: engine.next_trx_id(),
            undo: vec![],
            _writer: writer,
        }
    }

    #[inline]
    pub fn trx_id(&self) -> TrxID {
        self.trx_id
    }

    /// Reads see changes made by this transaction.
    #[inline]
    pub fn select(&self, plan: &SelectPlan) -> Result<Vec<Vec<dynq_datatype::Value>>> {
        execute_select(self.engine, plan)
    }

    /// Execute one compiled write statement, returning key of the affected row.
    #[inline]
    pub fn write(&mut self, stmt: &WriteStmt) -> Result<RowKey> {
        match stmt {
            WriteStmt::Insert(insert) => self.insert(insert),
            WriteStmt::Update(update) => self.update(update),
        }
    }

    pub fn insert(&mut self, stmt: &InsertStmt) -> Result<RowKey> {
        let table = self.engine.table(stmt.db.as_str(), stmt.table.as_str())?;
        let mut g = table.write();
        let pos = g.insert(&stmt.values)?;
        let key = g.row_key(&g.rows()[pos]);
        self.undo.push(UndoEntry {
            db: stmt.db.clone(),
            table: stmt.table.clone(),
            kind: UndoKind::Insert(pos),
        });
        Ok(key)
    }

    /// Update the row with given primary key. Zero matching rows is NotFound.
    pub fn update(&mut self, stmt: &UpdateStmt) -> Result<RowKey> {
        let table = self.engine.table(stmt.db.as_str(), stmt.table.as_str())?;
        let mut g = table.write();
        let key = RowKey::from(stmt.key_value.clone());
        let pos = g.find_by_key(&key).ok_or_else(|| Error::RecordNotFound {
            table: g.desc.qualified_name(),
            key: format_key(&key),
        })?;
        let old = g.update(pos, &stmt.values)?;
        self.undo.push(UndoEntry {
            db: stmt.db.clone(),
            table: stmt.table.clone(),
            kind: UndoKind::Update(pos, old),
        });
        Ok(key)
    }

    /// Probe keys of matching rows, then delete exactly those rows.
    /// Nothing is deleted if the probe finds no row.
    pub fn delete(&mut self, plan: &DeletePlan) -> Result<Vec<RowKey>> {
        let keys: Vec<RowKey> = self
            .select(&plan.key_probe)?
            .into_iter()
            .map(RowKey::new)
            .collect();
        if keys.is_empty() {
            return Err(Error::NoRecordsMatch(plan.table.qualified_name()));
        }
        let table = self
            .engine
            .table(plan.table.db.as_str(), plan.table.name.as_str())?;
        let mut g = table.write();
        let mut positions: Vec<usize> = keys.iter().filter_map(|k| g.find_by_key(k)).collect();
        positions.sort_unstable();
        // remove from the back so earlier positions stay valid.
        for pos in positions.into_iter().rev() {
            let row = g.remove(pos);
            self.undo.push(UndoEntry {
                db: plan.table.db.clone(),
                table: plan.table.name.clone(),
                kind: UndoKind::Delete(pos, row),
            });
        }
        Ok(keys)
    }

    /// Commit the transaction.
    #[inline]
    pub fn commit(mut self) -> TrxID {
        log::info!(
            "trx {} committed with {} changes",
            self.trx_id,
            self.undo.len()
        );
        self.undo.clear();
        self.trx_id
    }

    /// Rollback the transaction.
    #[inline]
    pub fn rollback(mut self) {
        self.undo_all();
    }

    fn undo_all(&mut self) {
        if self.undo.is_empty() {
            return;
        }
        log::warn!(
            "trx {} rolled back {} changes",
            self.trx_id,
            self.undo.len()
        );
        while let Some(entry) = self.undo.pop() {
            // the writer latch keeps tables from being dropped by writers,
            // a missing table has nothing left to restore.
            let Ok(table) = self.engine.table(entry.db.as_str(), entry.table.as_str()) else {
                continue;
            };
            let mut g = table.write();
            match entry.kind {
                UndoKind::Insert(pos) => {
                    g.remove(pos);
                }
                UndoKind::Update(pos, row) => g.replace(pos, row),
                UndoKind::Delete(pos, row) => g.restore(pos, row),
            }
        }
    }
}

impl Drop for ActiveTrx<'_> {
    #[inline]
    fn drop(&mut self) {
        self.undo_all();
    }
}
