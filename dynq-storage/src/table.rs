use crate::error::{Error, Result};
use dynq_catalog::TableDescriptor;
use dynq_datatype::Value;
use dynq_expr::ColRef;
use dynq_plan::RowKey;

pub type Row = Vec<Value>;

/// Live table: structure, rows in insertion order and the
/// auto-increment counter.
#[derive(Debug, Clone)]
pub struct Table {
    pub desc: TableDescriptor,
    rows: Vec<Row>,
    next_id: i64,
}

impl Table {
    #[inline]
    pub fn new(desc: TableDescriptor) -> Self {
        Table {
            desc,
            rows: vec![],
            next_id: 1,
        }
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Primary key of a row.
    #[inline]
    pub fn row_key(&self, row: &[Value]) -> RowKey {
        RowKey::new(self.desc.primary_key.iter().map(|idx| row[idx.value() as usize].clone()))
    }

    #[inline]
    pub fn find_by_key(&self, key: &RowKey) -> Option<usize> {
        if self.desc.primary_key.is_empty() {
            return None;
        }
        self.rows.iter().position(|r| &self.row_key(r) == key)
    }

    /// Insert one row built from given values.
    ///
    /// Missing columns get the auto-increment value or the literal
    /// default. Returns position of the new row.
    pub fn insert(&mut self, values: &[(ColRef, Value)]) -> Result<usize> {
        let mut row = vec![Value::Null; self.desc.columns.len()];
        let mut supplied = vec![false; row.len()];
        for (col, value) in values {
            let idx = self.check_value(col, value)?;
            row[idx] = value.clone();
            supplied[idx] = true;
        }
        for (c, supplied) in self.desc.columns.iter().zip(supplied) {
            let idx = c.idx.value() as usize;
            if supplied {
                if let (true, Value::Int(id)) = (c.is_auto_increment(), &row[idx]) {
                    self.next_id = self.next_id.max(*id + 1);
                }
            } else if c.is_auto_increment() {
                row[idx] = Value::Int(self.next_id);
                self.next_id += 1;
            } else if let Some(default) = &c.default {
                row[idx] = default.clone();
            }
        }
        self.check_not_null(&row)?;
        if !self.desc.primary_key.is_empty() {
            let key = self.row_key(&row);
            if self.find_by_key(&key).is_some() {
                return Err(Error::DuplicateKey {
                    table: self.desc.qualified_name(),
                    key: format_key(&key),
                });
            }
        }
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// Overwrite given columns of the row at `pos`, returning the old row.
    pub fn update(&mut self, pos: usize, values: &[(ColRef, Value)]) -> Result<Row> {
        let mut row = self.rows[pos].clone();
        for (col, value) in values {
            let idx = self.check_value(col, value)?;
            row[idx] = value.clone();
        }
        self.check_not_null(&row)?;
        Ok(std::mem::replace(&mut self.rows[pos], row))
    }

    #[inline]
    pub fn remove(&mut self, pos: usize) -> Row {
        self.rows.remove(pos)
    }

    #[inline]
    pub(crate) fn restore(&mut self, pos: usize, row: Row) {
        self.rows.insert(pos, row);
    }

    #[inline]
    pub(crate) fn replace(&mut self, pos: usize, row: Row) {
        self.rows[pos] = row;
    }

    fn check_value(&self, col: &ColRef, value: &Value) -> Result<usize> {
        let column = self.desc.expect_column(col.name.as_str())?;
        if !value.is_null() && !column.ty.matches(value) {
            return Err(Error::TypeMismatch {
                column: column.name.as_str().to_string(),
                value: value.to_string(),
                expected: column.ty,
            });
        }
        Ok(column.idx.value() as usize)
    }

    fn check_not_null(&self, row: &[Value]) -> Result<()> {
        match self
            .desc
            .columns
            .iter()
            .find(|c| {
                row[c.idx.value() as usize].is_null() && (!c.is_nullable() || c.is_primary_key())
            }) {
            Some(c) => Err(Error::NotNullViolation {
                table: self.desc.qualified_name(),
                column: c.name.as_str().to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[inline]
pub(crate) fn format_key(key: &RowKey) -> String {
    match key.values() {
        [single] => single.to_string(),
        values => {
            let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}
