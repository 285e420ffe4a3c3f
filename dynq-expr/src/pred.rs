use crate::pattern::like_match;
use dynq_catalog::{ColIndex, Column, TableDescriptor};
use dynq_datatype::{ScalarType, Value};
use semistr::SemiStr;
use smallvec::SmallVec;
use std::fmt;

/// Reference to a column of a resolved table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColRef {
    pub db: SemiStr,
    pub table: SemiStr,
    pub name: SemiStr,
    pub idx: ColIndex,
    pub ty: ScalarType,
}

impl ColRef {
    #[inline]
    pub fn new(table: &TableDescriptor, column: &Column) -> Self {
        ColRef {
            db: table.db.clone(),
            table: table.name.clone(),
            name: column.name.clone(),
            idx: column.idx,
            ty: column.ty,
        }
    }

    /// Returns whether this column belongs to given table.
    #[inline]
    pub fn belongs_to(&self, table: &TableDescriptor) -> bool {
        table.is(self.db.as_str(), self.table.as_str())
    }
}

impl fmt::Display for ColRef {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table.as_str(), self.name.as_str())
    }
}

/// Access to column values of one (possibly joined) row.
pub trait RowLookup {
    fn value(&self, col: &ColRef) -> Option<&Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
}

impl CmpOp {
    #[inline]
    pub const fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
        }
    }
}

/// Boolean condition tree over column comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Cmp {
        col: ColRef,
        op: CmpOp,
        value: Value,
    },
    InList {
        col: ColRef,
        values: SmallVec<[Value; 4]>,
    },
    Like {
        col: ColRef,
        pattern: String,
        case_insensitive: bool,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    #[inline]
    pub fn and(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::And(Box::new(lhs), Box::new(rhs))
    }

    #[inline]
    pub fn or(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Evaluate against a row.
    ///
    /// Any comparison on a null or missing value is false.
    pub fn eval<R: RowLookup + ?Sized>(&self, row: &R) -> bool {
        match self {
            Predicate::Cmp { col, op, value } => match non_null(row, col) {
                None => false,
                Some(v) => match op {
                    CmpOp::Eq => v == value,
                    CmpOp::Ne => v != value,
                    CmpOp::Gt => v > value,
                    CmpOp::Lt => v < value,
                },
            },
            Predicate::InList { col, values } => {
                non_null(row, col).is_some_and(|v| values.iter().any(|x| x == v))
            }
            Predicate::Like {
                col,
                pattern,
                case_insensitive,
            } => non_null(row, col)
                .is_some_and(|v| like_match(&v.to_text(), pattern, *case_insensitive)),
            Predicate::And(lhs, rhs) => lhs.eval(row) && rhs.eval(row),
            Predicate::Or(lhs, rhs) => lhs.eval(row) || rhs.eval(row),
        }
    }
}

#[inline]
fn non_null<'a, R: RowLookup + ?Sized>(row: &'a R, col: &ColRef) -> Option<&'a Value> {
    row.value(col).filter(|v| !v.is_null())
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Cmp { col, op, value } => write!(f, "{} {} {}", col, op.symbol(), value),
            Predicate::InList { col, values } => {
                write!(f, "{} IN (", col)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str(")")
            }
            Predicate::Like {
                col,
                pattern,
                case_insensitive,
            } => {
                let op = if *case_insensitive { "ILIKE" } else { "LIKE" };
                write!(f, "{} {} '{}'", col, op, pattern)
            }
            Predicate::And(lhs, rhs) => write!(f, "({} AND {})", lhs, rhs),
            Predicate::Or(lhs, rhs) => write!(f, "({} OR {})", lhs, rhs),
        }
    }
}
