use crate::config::{SaveConfig, ServerConfig};
use crate::error::{Error, Result};
use dynq_plan::{
    DeleteSpec, FetchSpec, Record, RowKey, WriteSpec, assemble_delete, assemble_select,
    compile_write, zip_rows,
};
use dynq_storage::engine::Engine;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};
use std::str::FromStr;

/// Request operation accepted by [`Service::handle_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Save,
    Delete,
}

impl FromStr for Operation {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fetch" => Ok(Operation::Fetch),
            "save" => Ok(Operation::Save),
            "delete" => Ok(Operation::Delete),
            _ => Err(Error::UnknownOperation(s.to_string())),
        }
    }
}

/// Entry point of read, write and delete requests.
///
/// Every request resolves table structure afresh, compiles fully before
/// touching the store and runs its writes in one transaction.
#[derive(Clone)]
pub struct Service {
    engine: Engine,
    save: SaveConfig,
}

impl Service {
    #[inline]
    pub fn new(engine: Engine, save: SaveConfig) -> Self {
        Service { engine, save }
    }

    /// Create the engine and all configured tables.
    #[inline]
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let engine = config.engine.build()?;
        Ok(Service::new(engine, config.save))
    }

    #[inline]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn fetch(&self, spec: &FetchSpec) -> Result<Vec<Record>> {
        let plan = assemble_select(self.engine.registry(), spec)?;
        let rows = self.engine.new_session().select(&plan)?;
        Ok(zip_rows(&spec.fields, rows))
    }

    /// Delete all rows matching the filters and return their keys.
    /// Fails with NotFound and deletes nothing if no row matches.
    pub fn delete(&self, spec: &DeleteSpec) -> Result<Vec<RowKey>> {
        let plan = assemble_delete(self.engine.registry(), spec)?;
        let session = self.engine.new_session();
        let mut trx = session.begin_trx();
        let keys = trx.delete(&plan)?;
        let trx_id = trx.commit();
        log::info!(
            "deleted {} rows from {} in trx {}",
            keys.len(),
            plan.table.qualified_name(),
            trx_id
        );
        Ok(keys)
    }

    /// Insert all items, or update one item by `rec_id`, atomically.
    pub fn save(&self, spec: &WriteSpec) -> Result<Vec<RowKey>> {
        if spec.items.len() > self.save.create_batch_size {
            return Err(Error::BatchTooLarge {
                size: spec.items.len(),
                max: self.save.create_batch_size,
            });
        }
        let table = self
            .engine
            .registry()
            .resolve(&spec.db_name, &spec.table_name)
            .map_err(dynq_plan::error::Error::from)?;
        let stmts = compile_write(&table, spec.rec_id.as_ref(), &spec.items)?;
        let session = self.engine.new_session();
        let mut trx = session.begin_trx();
        let mut keys = Vec::with_capacity(stmts.len());
        for stmt in &stmts {
            // an error drops the transaction, which rolls back all prior statements.
            keys.push(trx.write(stmt)?);
        }
        let trx_id = trx.commit();
        log::info!(
            "saved {} rows into {} in trx {}",
            keys.len(),
            table.qualified_name(),
            trx_id
        );
        Ok(keys)
    }

    /// Handle a JSON request body and return the JSON response envelope.
    ///
    /// Success is `{"data": ..., "message": ...}`, failure is
    /// `{"error": {"kind": ..., "message": ..., "field": ...}}`.
    pub fn handle_json(&self, op: &str, body: &str) -> JsonValue {
        match self.dispatch(op, body) {
            Ok((data, message)) => json!({ "data": data, "message": message }),
            Err(e) => {
                log::debug!("request {} failed: {}", op, e);
                error_response(&e)
            }
        }
    }

    fn dispatch(&self, op: &str, body: &str) -> Result<(JsonValue, &'static str)> {
        match op.parse::<Operation>()? {
            Operation::Fetch => {
                let records = self.fetch(&parse_body::<FetchSpec>(body)?)?;
                Ok((to_json(&records)?, "Fetch Success"))
            }
            Operation::Save => {
                let spec = parse_body::<WriteSpec>(body)?;
                let keys = self.save(&spec)?;
                let message = if spec.rec_id.is_some() {
                    "updated successfully"
                } else {
                    "saved successfully"
                };
                Ok((to_json(&keys)?, message))
            }
            Operation::Delete => {
                let keys = self.delete(&parse_body::<DeleteSpec>(body)?)?;
                Ok((to_json(&keys)?, "deleted successfully"))
            }
        }
    }
}

#[inline]
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::InvalidRequest(e.to_string()))
}

#[inline]
fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| Error::InvalidRequest(e.to_string()))
}

/// Error envelope with kind, message and optional field path.
#[inline]
pub fn error_response(e: &Error) -> JsonValue {
    json!({
        "error": {
            "kind": e.kind().as_str(),
            "message": e.to_string(),
            "field": e.field(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynq_catalog::error::ErrorKind;

    #[test]
    fn test_operation_from_str() {
        assert_eq!("fetch".parse::<Operation>().unwrap(), Operation::Fetch);
        assert_eq!("save".parse::<Operation>().unwrap(), Operation::Save);
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Delete);
        let err = "login".parse::<Operation>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_response() {
        let e = Error::BatchTooLarge { size: 11, max: 10 };
        assert_eq!(
            error_response(&e),
            json!({"error": {
                "kind": "ValidationError",
                "message": "Only 10 records allowed at a time.",
                "field": null,
            }})
        );
    }
}
