use crate::error::{Error, Result};
use crate::spec::WriteItem;
use dynq_catalog::{Column, TableDescriptor};
use dynq_datatype::{ScalarType, Value};
use dynq_expr::ColRef;
use indexmap::IndexMap;
use semistr::SemiStr;
use std::fmt;

/// Validation rule of one writable column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub col: ColRef,
    pub ty: ScalarType,
    pub required: bool,
    pub nullable: bool,
    pub has_default: bool,
    pub max_len: Option<u32>,
}

impl FieldRule {
    #[inline]
    fn new(table: &TableDescriptor, column: &Column) -> Self {
        FieldRule {
            col: ColRef::new(table, column),
            ty: column.ty,
            required: !column.is_nullable() && !column.has_default(),
            nullable: column.is_nullable(),
            has_default: column.has_default(),
            max_len: column.max_len,
        }
    }
}

/// Write-time schema derived from the live structure of a table.
///
/// Primary key columns are excluded. Nullable or defaulted columns are
/// optional and all others are required.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    fields: IndexMap<SemiStr, FieldRule>,
}

impl RecordSchema {
    pub fn derive(table: &TableDescriptor) -> Self {
        let fields = table
            .columns
            .iter()
            .filter(|c| !c.is_primary_key())
            .map(|c| (c.name.clone(), FieldRule::new(table, c)))
            .collect();
        RecordSchema { fields }
    }

    #[inline]
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    #[inline]
    pub fn rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.fields.values()
    }

    /// Validate one item and return the values to write, in column order.
    ///
    /// A falsy value other than `false` on a defaulted column is left out
    /// so the store default applies.
    pub fn validate(&self, item_no: usize, item: &WriteItem) -> Result<Vec<(ColRef, Value)>> {
        if let Some(name) = item.keys().find(|k| !self.fields.contains_key(k.as_str())) {
            return Err(Error::UnknownWriteField {
                item: item_no,
                field: name.clone(),
            });
        }
        let mut values = Vec::with_capacity(item.len());
        for (name, rule) in &self.fields {
            let Some(json) = item.get(name.as_str()) else {
                if rule.required {
                    return Err(Error::MissingField {
                        item: item_no,
                        field: name.as_str().to_string(),
                    });
                }
                continue;
            };
            let mismatch = || Error::WriteTypeMismatch {
                item: item_no,
                field: name.as_str().to_string(),
                value: json.to_string(),
                expected: rule.ty,
            };
            let value = Value::from_json(json).map_err(|_| mismatch())?;
            let value = if value.is_null() {
                if !rule.nullable && !rule.has_default {
                    return Err(Error::NullNotAllowed {
                        item: item_no,
                        field: name.as_str().to_string(),
                    });
                }
                value
            } else {
                value.coerce(rule.ty).ok_or_else(mismatch)?
            };
            if let (Value::Str(s), Some(max_len)) = (&value, rule.max_len) {
                if s.chars().count() > max_len as usize {
                    return Err(Error::TooLong {
                        item: item_no,
                        field: name.as_str().to_string(),
                        max_len,
                    });
                }
            }
            if rule.has_default && value.is_falsy() && !matches!(value, Value::Bool(false)) {
                continue;
            }
            values.push((rule.col.clone(), value));
        }
        Ok(values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub db: SemiStr,
    pub table: SemiStr,
    pub values: Vec<(ColRef, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub db: SemiStr,
    pub table: SemiStr,
    pub key: ColRef,
    pub key_value: Value,
    pub values: Vec<(ColRef, Value)>,
}

/// One compiled write statement.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteStmt {
    Insert(InsertStmt),
    Update(UpdateStmt),
}

impl fmt::Display for WriteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStmt::Insert(stmt) => {
                write!(f, "INSERT INTO {}.{} (", stmt.db.as_str(), stmt.table.as_str())?;
                for (i, (col, _)) in stmt.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(col.name.as_str())?;
                }
                f.write_str(") VALUES (")?;
                for (i, (_, v)) in stmt.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str(")")
            }
            WriteStmt::Update(stmt) => {
                write!(f, "UPDATE {}.{} SET ", stmt.db.as_str(), stmt.table.as_str())?;
                for (i, (col, v)) in stmt.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", col.name.as_str(), v)?;
                }
                write!(f, " WHERE {} = {}", stmt.key.name.as_str(), stmt.key_value)
            }
        }
    }
}

/// Compile write items into statements, one per item in input order.
///
/// With `rec_id` exactly one item is allowed and it updates the row whose
/// single-column primary key equals `rec_id`.
pub fn compile_write(
    table: &TableDescriptor,
    rec_id: Option<&Value>,
    items: &[WriteItem],
) -> Result<Vec<WriteStmt>> {
    if rec_id.is_some() {
        match items.len() {
            0 => return Err(Error::MissingUpdateItem),
            1 => (),
            _ => return Err(Error::MultipleUpdateItems),
        }
    }
    let key = match rec_id {
        None => None,
        Some(id) => {
            let pk = table
                .single_pk()
                .ok_or_else(|| Error::NoSingleKey(table.qualified_name()))?;
            let key_value = id.clone().cast(pk.ty).ok_or_else(|| Error::RecIdTypeMismatch {
                value: id.to_string(),
                expected: pk.ty,
            })?;
            Some((ColRef::new(table, pk), key_value))
        }
    };
    let schema = RecordSchema::derive(table);
    let mut stmts = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let values = schema.validate(i, item)?;
        let stmt = match &key {
            None => WriteStmt::Insert(InsertStmt {
                db: table.db.clone(),
                table: table.name.clone(),
                values,
            }),
            Some((key, key_value)) => WriteStmt::Update(UpdateStmt {
                db: table.db.clone(),
                table: table.name.clone(),
                key: key.clone(),
                key_value: key_value.clone(),
                values,
            }),
        };
        log::debug!("compiled write: {}", stmt);
        stmts.push(stmt);
    }
    Ok(stmts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::registry;
    use dynq_catalog::error::ErrorKind;
    use serde_json::json;

    fn customers() -> TableDescriptor {
        registry().resolve("shop", "customers").unwrap()
    }

    fn item(v: serde_json::Value) -> WriteItem {
        match v {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn names(values: &[(ColRef, Value)]) -> Vec<&str> {
        values.iter().map(|(c, _)| c.name.as_str()).collect()
    }

    #[test]
    fn test_derive_record_schema() {
        let schema = RecordSchema::derive(&customers());
        // primary key is never writable.
        assert!(schema.rule("id").is_none());
        assert!(schema.rule("name").unwrap().required);
        assert_eq!(schema.rule("name").unwrap().max_len, Some(8));
        assert!(!schema.rule("dob").unwrap().required);
        assert!(!schema.rule("status").unwrap().required);
        assert!(schema.rule("status").unwrap().has_default);
        assert_eq!(
            schema.rules().map(|r| r.col.name.as_str()).collect::<Vec<_>>(),
            vec!["name", "dob", "status", "is_active", "experience", "score", "class_id"]
        );
    }

    #[test]
    fn test_compile_insert() {
        let items = vec![
            item(json!({"score": 3, "name": " Ann ", "dob": "1990-02-03"})),
            item(json!({"name": "Bob", "is_active": false, "status": "", "experience": 0})),
        ];
        let stmts = compile_write(&customers(), None, &items).unwrap();
        assert_eq!(stmts.len(), 2);
        let WriteStmt::Insert(first) = &stmts[0] else {
            panic!("expected insert")
        };
        assert_eq!(names(&first.values), vec!["name", "dob", "score"]);
        assert_eq!(first.values[0].1, Value::from("Ann"));
        assert!(matches!(first.values[1].1, Value::Date(_)));
        assert!(matches!(first.values[2].1, Value::Float(_)));
        assert_eq!(
            stmts[0].to_string(),
            "INSERT INTO shop.customers (name, dob, score) VALUES ('Ann', '1990-02-03', 3)"
        );

        // false is kept on a defaulted column, empty string is dropped,
        // zero is kept on a column without default.
        let WriteStmt::Insert(second) = &stmts[1] else {
            panic!("expected insert")
        };
        assert_eq!(names(&second.values), vec!["name", "is_active", "experience"]);
        assert_eq!(second.values[1].1, Value::Bool(false));
        assert_eq!(second.values[2].1, Value::Int(0));
    }

    #[test]
    fn test_compile_update() {
        let t = customers();
        let stmts = compile_write(
            &t,
            Some(&Value::Int(7)),
            &[item(json!({"experience": 4, "name": "Zed"}))],
        )
        .unwrap();
        assert_eq!(stmts.len(), 1);
        // only supplied fields are written.
        assert_eq!(
            stmts[0].to_string(),
            "UPDATE shop.customers SET name = 'Zed', experience = 4 WHERE id = 7"
        );
        // updates validate against the same schema as inserts.
        assert!(matches!(
            compile_write(&t, Some(&Value::Int(7)), &[item(json!({}))]),
            Err(Error::MissingField { .. })
        ));

        let err = compile_write(
            &t,
            Some(&Value::Int(7)),
            &[item(json!({"name": "a"})), item(json!({"name": "b"}))],
        )
        .unwrap_err();
        assert_eq!(err, Error::MultipleUpdateItems);
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = compile_write(&t, Some(&Value::Int(1)), &[]).unwrap_err();
        assert_eq!(err, Error::MissingUpdateItem);
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = compile_write(&t, Some(&Value::from("7")), &[item(json!({"name": "a"}))])
            .unwrap_err();
        assert!(matches!(err, Error::RecIdTypeMismatch { .. }));

        let audit = registry().resolve("hr", "audit").unwrap();
        let err = compile_write(&audit, Some(&Value::Int(1)), &[item(json!({"note": "x"}))])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_compile_write_validation() {
        let t = customers();
        let cases = [
            (json!({"name": "a", "nope": 1}), "nope"),
            (json!({"name": "a", "id": 1}), "id"),
            (json!({"dob": null}), "name"),
            (json!({"name": null}), "name"),
            (json!({"name": 5}), "name"),
            (json!({"name": "a", "experience": 1.5}), "experience"),
            (json!({"name": "a", "is_active": 1}), "is_active"),
            (json!({"name": "a", "dob": "yesterday"}), "dob"),
            (json!({"name": "a", "score": [1]}), "score"),
            (json!({"name": "abcdefghi"}), "name"),
        ];
        for (v, field) in cases {
            let err = compile_write(&t, None, &[item(v.clone())]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::WriteValidation, "{}", v);
            assert_eq!(err.field(), Some(field), "{}", v);
        }
        // the item index is reported.
        let err = compile_write(&t, None, &[item(json!({"name": "a"})), item(json!({}))])
            .unwrap_err();
        assert_eq!(
            err,
            Error::MissingField {
                item: 1,
                field: "name".to_string()
            }
        );
        // max length counts characters after trimming.
        assert!(compile_write(&t, None, &[item(json!({"name": "  abcdefgh  "}))]).is_ok());
        // null on a defaulted column is dropped.
        let stmts = compile_write(&t, None, &[item(json!({"name": "a", "status": null}))]).unwrap();
        let WriteStmt::Insert(stmt) = &stmts[0] else {
            panic!("expected insert")
        };
        assert_eq!(names(&stmt.values), vec!["name"]);
    }

    #[test]
    fn test_compile_empty_items() {
        assert_eq!(compile_write(&customers(), None, &[]).unwrap(), vec![]);
    }
}
