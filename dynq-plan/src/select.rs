use crate::error::{Error, Result};
use crate::spec::{FetchSpec, MAX_PAGE_SIZE, SortDirection};
use dynq_catalog::registry::FieldRef;
use dynq_catalog::{CatalogRegistry, TableCache, TableDescriptor};
use dynq_expr::{ColRef, Predicate, compile_filters};
use std::fmt;

/// Inner equi-join of one more table into the query.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    // joined table, owner of the right column.
    pub table: TableDescriptor,
    pub left: ColRef,
    pub right: ColRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub col: ColRef,
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: usize,
    pub limit: usize,
}

impl Limit {
    /// Convert a page window into offset and limit.
    ///
    /// An offset past the addressable range is capped, which yields an
    /// empty page.
    #[inline]
    pub fn from_page(page_number: i64, page_size: i64) -> Result<Self> {
        if page_number < 1 {
            return Err(Error::PageNumberOutOfRange(page_number));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::PageSizeOutOfRange(page_size));
        }
        let offset = (page_number - 1)
            .checked_mul(page_size)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);
        Ok(Limit {
            offset,
            limit: page_size as usize,
        })
    }
}

/// Compiled read statement.
///
/// Execution order is fixed: filter on the primary table, joins in
/// declaration order, sort, projection, distinct, then limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub table: TableDescriptor,
    pub projection: Vec<ColRef>,
    pub filter: Option<Predicate>,
    pub joins: Vec<JoinPlan>,
    pub order: Option<OrderBy>,
    pub limit: Option<Limit>,
    pub distinct: bool,
}

impl SelectPlan {
    /// Plain scan of a table projecting given columns.
    #[inline]
    pub fn scan(
        table: TableDescriptor,
        projection: Vec<ColRef>,
        filter: Option<Predicate>,
    ) -> Self {
        SelectPlan {
            table,
            projection,
            filter,
            joins: vec![],
            order: None,
            limit: None,
            distinct: false,
        }
    }

    /// Primary table followed by joined tables.
    #[inline]
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        std::iter::once(&self.table).chain(self.joins.iter().map(|j| &j.table))
    }

    #[inline]
    fn contains_table(&self, db: &str, table: &str) -> bool {
        self.tables().any(|t| t.is(db, table))
    }
}

impl fmt::Display for SelectPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        for (i, c) in self.projection.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, " FROM {}", self.table.qualified_name())?;
        for j in &self.joins {
            write!(f, " JOIN {} ON {} = {}", j.table.qualified_name(), j.left, j.right)?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }
        if let Some(order) = &self.order {
            write!(f, " ORDER BY {} {}", order.col, if order.desc { "DESC" } else { "ASC" })?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {} OFFSET {}", limit.limit, limit.offset)?;
        }
        Ok(())
    }
}

/// Assemble a read request into a select plan.
///
/// Pagination is validated before any lookup. Filters and sort bind to
/// the primary table. Each join's left column must belong to a table
/// already in the query, and its right column brings in a new table.
pub fn assemble_select(registry: &CatalogRegistry, spec: &FetchSpec) -> Result<SelectPlan> {
    let limit = Limit::from_page(spec.page_number, spec.page_size)?;
    if spec.fields.is_empty() {
        return Err(Error::EmptyProjection);
    }
    let mut cache = TableCache::new(registry);
    let table = cache.resolve(&spec.db_name, &spec.table_name)?.clone();
    let filter = compile_filters(&table, &spec.filters)?;
    let mut plan = SelectPlan::scan(table, vec![], filter);

    for join in &spec.joins {
        let left = cache.resolve_field(&join.left_ref)?;
        let right = cache.resolve_field(&join.right_ref)?;
        if !plan.contains_table(left.table.db.as_str(), left.table.name.as_str()) {
            return Err(Error::JoinOutsideQuery(join.left_ref.clone()));
        }
        if plan.contains_table(right.table.db.as_str(), right.table.name.as_str()) {
            return Err(Error::DuplicateJoinTable(right.table.qualified_name()));
        }
        if left.column.ty != right.column.ty {
            return Err(Error::JoinTypeMismatch {
                left: join.left_ref.clone(),
                left_ty: left.column.ty,
                right: join.right_ref.clone(),
                right_ty: right.column.ty,
            });
        }
        plan.joins.push(JoinPlan {
            left: ColRef::new(&left.table, &left.column),
            right: ColRef::new(&right.table, &right.column),
            table: right.table,
        });
    }

    for field in &spec.fields {
        let col = bind_projection(&plan, field)?;
        plan.projection.push(col);
    }

    if let Some(sort) = &spec.sort {
        let column = plan
            .table
            .column(&sort.field)
            .ok_or_else(|| Error::UnknownSortField(sort.field.clone()))?;
        plan.order = Some(OrderBy {
            col: ColRef::new(&plan.table, column),
            desc: sort.direction == SortDirection::Desc,
        });
    }
    plan.limit = Some(limit);
    plan.distinct = spec.distinct;
    log::debug!("assembled select: {}", plan);
    Ok(plan)
}

/// Plain names bind to the primary table. Qualified names bind to the
/// first participating table they match.
fn bind_projection(plan: &SelectPlan, field: &str) -> Result<ColRef> {
    if !field.contains('.') {
        let column = plan
            .table
            .column(field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))?;
        return Ok(ColRef::new(&plan.table, column));
    }
    let fr = FieldRef::parse(field)?;
    let table = plan
        .tables()
        .find(|t| t.name.as_str() == fr.table && fr.db.is_none_or(|db| t.db.as_str() == db))
        .ok_or_else(|| Error::UnknownField(field.to_string()))?;
    let column = table
        .column(fr.column)
        .ok_or_else(|| Error::UnknownField(field.to_string()))?;
    Ok(ColRef::new(table, column))
}
