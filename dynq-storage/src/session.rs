use crate::engine::Engine;
use crate::error::Result;
use crate::table::Row;
use crate::trx::ActiveTrx;
use dynq_datatype::Value;
use dynq_expr::{ColRef, RowLookup};
use dynq_plan::SelectPlan;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Per-request handle of the engine.
pub struct Session {
    pub(crate) engine: Engine,
}

impl Session {
    #[inline]
    pub(crate) fn new(engine: Engine) -> Self {
        Session { engine }
    }

    #[inline]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Execute a select plan and return projected rows.
    #[inline]
    pub fn select(&self, plan: &SelectPlan) -> Result<Vec<Vec<Value>>> {
        execute_select(&self.engine, plan)
    }

    /// Begin a write transaction. Blocks while another one is active.
    #[inline]
    pub fn begin_trx(&self) -> ActiveTrx<'_> {
        ActiveTrx::new(&self.engine)
    }
}

/// Values of one joined row, one source row per participating table.
struct JoinedRow<'a> {
    layout: &'a [(&'a str, &'a str)],
    rows: SmallVec<[&'a Row; 4]>,
}

impl RowLookup for JoinedRow<'_> {
    #[inline]
    fn value(&self, col: &ColRef) -> Option<&Value> {
        let pos = self
            .layout
            .iter()
            .position(|(db, table)| *db == col.db.as_str() && *table == col.table.as_str())?;
        self.rows.get(pos)?.get(col.idx.value() as usize)
    }
}

pub(crate) fn execute_select(engine: &Engine, plan: &SelectPlan) -> Result<Vec<Vec<Value>>> {
    // snapshot every participating table so no lock is held while joining.
    let snapshots = plan
        .tables()
        .map(|t| {
            let table = engine.table(t.db.as_str(), t.name.as_str())?;
            let rows = table.read().rows().to_vec();
            Ok(rows)
        })
        .collect::<Result<Vec<Vec<Row>>>>()?;
    let layout: Vec<(&str, &str)> = plan
        .tables()
        .map(|t| (t.db.as_str(), t.name.as_str()))
        .collect();

    let mut joined: Vec<JoinedRow> = snapshots[0]
        .iter()
        .map(|r| JoinedRow {
            layout: &layout[..1],
            rows: SmallVec::from_elem(r, 1),
        })
        .filter(|jr| plan.filter.as_ref().is_none_or(|p| p.eval(jr)))
        .collect();

    for (i, join) in plan.joins.iter().enumerate() {
        let right_rows = &snapshots[i + 1];
        let layout = &layout[..i + 2];
        let mut next = Vec::new();
        for jr in &joined {
            let Some(lv) = jr.value(&join.left).filter(|v| !v.is_null()) else {
                continue;
            };
            for rr in right_rows {
                if rr.get(join.right.idx.value() as usize) == Some(lv) {
                    let mut rows = jr.rows.clone();
                    rows.push(rr);
                    next.push(JoinedRow { layout, rows });
                }
            }
        }
        joined = next;
    }

    if let Some(order) = &plan.order {
        joined.sort_by(|a, b| {
            let ord = match (a.value(&order.col), b.value(&order.col)) {
                (Some(l), Some(r)) => l.sort_cmp(r),
                _ => Ordering::Equal,
            };
            if order.desc { ord.reverse() } else { ord }
        });
    }

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(joined.len());
    for jr in &joined {
        let row: Vec<Value> = plan
            .projection
            .iter()
            .map(|c| jr.value(c).cloned().unwrap_or(Value::Null))
            .collect();
        if plan.distinct && rows.contains(&row) {
            continue;
        }
        rows.push(row);
    }

    if let Some(limit) = &plan.limit {
        rows = rows
            .into_iter()
            .skip(limit.offset)
            .take(limit.limit)
            .collect();
    }
    log::debug!("select returned {} rows: {}", rows.len(), plan);
    Ok(rows)
}
