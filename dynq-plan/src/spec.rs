use dynq_datatype::Value;
use dynq_expr::FilterItem;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Equality join between two fully-qualified field references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JoinSpec {
    pub left_ref: String,
    pub right_ref: String,
}

impl JoinSpec {
    #[inline]
    pub fn new(left_ref: &str, right_ref: &str) -> Self {
        JoinSpec {
            left_ref: left_ref.to_string(),
            right_ref: right_ref.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Read request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FetchSpec {
    pub db_name: String,
    pub table_name: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterItem>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub distinct: bool,
}

impl FetchSpec {
    #[inline]
    pub fn new(db_name: &str, table_name: &str, fields: &[&str]) -> Self {
        FetchSpec {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            filters: vec![],
            joins: vec![],
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            distinct: false,
        }
    }

    #[inline]
    pub fn filter(mut self, item: FilterItem) -> Self {
        self.filters.push(item);
        self
    }

    #[inline]
    pub fn join(mut self, left_ref: &str, right_ref: &str) -> Self {
        self.joins.push(JoinSpec::new(left_ref, right_ref));
        self
    }

    #[inline]
    pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            field: field.to_string(),
            direction,
        });
        self
    }

    #[inline]
    pub fn page(mut self, page_number: i64, page_size: i64) -> Self {
        self.page_number = page_number;
        self.page_size = page_size;
        self
    }

    #[inline]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

#[inline]
fn default_page_number() -> i64 {
    DEFAULT_PAGE_NUMBER
}

#[inline]
fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Delete request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteSpec {
    pub db_name: String,
    pub table_name: String,
    #[serde(default)]
    pub filters: Vec<FilterItem>,
}

impl DeleteSpec {
    #[inline]
    pub fn new(db_name: &str, table_name: &str, filters: Vec<FilterItem>) -> Self {
        DeleteSpec {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            filters,
        }
    }
}

/// One record of a write request, keyed by column name.
pub type WriteItem = JsonMap<String, JsonValue>;

/// Insert or update request.
///
/// Without `rec_id` every item is inserted. With `rec_id` the single
/// item updates the row whose primary key equals it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WriteSpec {
    pub db_name: String,
    pub table_name: String,
    #[serde(default)]
    pub rec_id: Option<Value>,
    pub items: Vec<WriteItem>,
}

impl WriteSpec {
    #[inline]
    pub fn insert(db_name: &str, table_name: &str, items: Vec<WriteItem>) -> Self {
        WriteSpec {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            rec_id: None,
            items,
        }
    }

    #[inline]
    pub fn update(db_name: &str, table_name: &str, rec_id: Value, item: WriteItem) -> Self {
        WriteSpec {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            rec_id: Some(rec_id),
            items: vec![item],
        }
    }
}
