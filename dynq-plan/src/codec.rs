use dynq_datatype::Value;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use smallvec::SmallVec;

/// One result row keyed by requested field name, in request order.
pub type Record = IndexMap<String, Value>;

/// Zip declared field names positionally against each row.
///
/// Row order is preserved. A repeated field name keeps its last value.
pub fn zip_rows(fields: &[String], rows: Vec<Vec<Value>>) -> Vec<Record> {
    rows.into_iter()
        .map(|row| {
            debug_assert_eq!(fields.len(), row.len());
            fields.iter().cloned().zip(row).collect()
        })
        .collect()
}

/// Primary key value(s) of one affected row.
///
/// Serialized as a plain scalar for a single-column key and as an
/// array for a composite key.
#[derive(Debug, Clone, PartialEq)]
pub struct RowKey(SmallVec<[Value; 1]>);

impl RowKey {
    #[inline]
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        RowKey(values.into_iter().collect())
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl From<Value> for RowKey {
    #[inline]
    fn from(value: Value) -> Self {
        RowKey::new([value])
    }
}

impl Serialize for RowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => single.serialize(serializer),
            values => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for v in values {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_rows() {
        let fields = vec!["name".to_string(), "id".to_string()];
        let rows = vec![
            vec![Value::from("b"), Value::Int(2)],
            vec![Value::from("a"), Value::Null],
        ];
        let records = zip_rows(&fields, rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], Value::from("b"));
        assert_eq!(records[1]["id"], Value::Null);
        assert_eq!(
            serde_json::to_string(&records).unwrap(),
            r#"[{"name":"b","id":2},{"name":"a","id":null}]"#
        );
        assert!(zip_rows(&fields, vec![]).is_empty());
    }

    #[test]
    fn test_row_key_serialize() {
        assert_eq!(serde_json::to_string(&RowKey::from(Value::Int(3))).unwrap(), "3");
        let key = RowKey::new([Value::Int(3), Value::from("x")]);
        assert_eq!(key.values().len(), 2);
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"[3,"x"]"#);
    }
}
