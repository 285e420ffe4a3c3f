use crate::error::Result;
use crate::select::SelectPlan;
use crate::spec::DeleteSpec;
use dynq_catalog::error::Error as CatalogError;
use dynq_catalog::{CatalogRegistry, TableDescriptor};
use dynq_expr::{ColRef, Predicate, compile_filters};

/// Compiled delete statement.
///
/// The key probe reads primary keys of all matching rows under the same
/// predicate. Executors run it first and skip the delete if it is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletePlan {
    pub table: TableDescriptor,
    pub key: Vec<ColRef>,
    pub filter: Option<Predicate>,
    pub key_probe: SelectPlan,
}

/// Assemble a delete request. The table must have a primary key.
pub fn assemble_delete(registry: &CatalogRegistry, spec: &DeleteSpec) -> Result<DeletePlan> {
    let table = registry.resolve(&spec.db_name, &spec.table_name)?;
    if table.primary_key.is_empty() {
        return Err(CatalogError::NoPrimaryKey(table.qualified_name()).into());
    }
    let filter = compile_filters(&table, &spec.filters)?;
    let key: Vec<ColRef> = table.pk_columns().map(|c| ColRef::new(&table, c)).collect();
    let key_probe = SelectPlan::scan(table.clone(), key.clone(), filter.clone());
    log::debug!("assembled delete probe: {}", key_probe);
    Ok(DeletePlan {
        table,
        key,
        filter,
        key_probe,
    })
}
