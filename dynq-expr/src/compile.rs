use crate::error::{Error, Result};
use crate::filter::{FilterItem, LogicalOp, Operator};
use crate::pred::{CmpOp, ColRef, Predicate};
use dynq_catalog::TableDescriptor;
use dynq_datatype::Value;
use smallvec::SmallVec;

/// Compile ordered filter items into a single predicate.
///
/// Conditions are folded strictly left to right without precedence:
/// the accumulated condition is combined with the next one using the
/// `join_to_next` of the previous item. The last item's `join_to_next`
/// is ignored. Returns None if there is no filter item.
pub fn compile_filters(table: &TableDescriptor, items: &[FilterItem]) -> Result<Option<Predicate>> {
    let mut acc: Option<Predicate> = None;
    let mut prev = LogicalOp::And;
    for item in items {
        let cond = compile_item(table, item)?;
        acc = Some(match acc {
            None => cond,
            Some(acc) => match prev {
                LogicalOp::Or => Predicate::or(acc, cond),
                LogicalOp::And => Predicate::and(acc, cond),
            },
        });
        prev = item.join_to_next;
    }
    Ok(acc)
}

fn compile_item(table: &TableDescriptor, item: &FilterItem) -> Result<Predicate> {
    let column = table
        .column(&item.field)
        .ok_or_else(|| Error::UnknownField {
            table: table.qualified_name(),
            field: item.field.clone(),
        })?;
    if item.values.is_empty() {
        return Err(Error::EmptyValues(item.field.clone()));
    }
    if item.values.len() > 1 && !item.operator.is_multi_valued() {
        return Err(Error::MultipleValues {
            field: item.field.clone(),
            operator: item.operator,
        });
    }
    let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(item.values.len());
    for v in &item.values {
        let typed = v.clone().cast(column.ty).ok_or_else(|| Error::TypeMismatch {
            field: item.field.clone(),
            value: v.to_string(),
            expected: column.ty,
        })?;
        values.push(typed);
    }
    let col = ColRef::new(table, column);
    let pred = match item.operator {
        Operator::In => Predicate::InList { col, values },
        Operator::Like | Operator::ILike => Predicate::Like {
            col,
            pattern: values[0].to_text().into_owned(),
            case_insensitive: item.operator == Operator::ILike,
        },
        op => {
            let op = match op {
                Operator::Eq => CmpOp::Eq,
                Operator::Not => CmpOp::Ne,
                Operator::Gt => CmpOp::Gt,
                _ => CmpOp::Lt,
            };
            Predicate::Cmp {
                col,
                op,
                value: values.swap_remove(0),
            }
        }
    };
    Ok(pred)
}
