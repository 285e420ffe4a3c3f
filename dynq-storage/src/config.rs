use crate::database::Database;
use crate::engine::Engine;
use crate::error::{Error, Result};
use dynq_catalog::{Catalog, ColumnAttributes, ColumnSpec, TableSpec};
use dynq_datatype::{ScalarType, Value};
use serde::{Deserialize, Serialize};

/// Bootstrap configuration: the databases and tables to create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub databases: Vec<DatabaseConfig>,
}

impl EngineConfig {
    #[inline]
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.databases.push(database);
        self
    }

    #[inline]
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Create all configured databases and tables.
    pub fn build(self) -> Result<Engine> {
        let mut databases = Vec::with_capacity(self.databases.len());
        for db_config in self.databases {
            let db = Database::new(&db_config.name);
            for table in db_config.tables {
                db.create_table(table.into_spec()?)?;
            }
            databases.push(db);
        }
        Engine::new(databases)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl DatabaseConfig {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        DatabaseConfig {
            name: name.into(),
            tables: vec![],
        }
    }

    #[inline]
    pub fn table(mut self, table: TableConfig) -> Self {
        self.tables.push(table);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub columns: Vec<ColumnConfig>,
}

impl TableConfig {
    #[inline]
    pub fn new(name: impl Into<String>, columns: Vec<ColumnConfig>) -> Self {
        TableConfig {
            name: name.into(),
            columns,
        }
    }

    fn into_spec(self) -> Result<TableSpec> {
        let columns = self
            .columns
            .into_iter()
            .map(ColumnConfig::into_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(TableSpec::new(&self.name, columns))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ScalarType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<u32>,
}

impl ColumnConfig {
    #[inline]
    pub fn new(name: impl Into<String>, ty: ScalarType) -> Self {
        ColumnConfig {
            name: name.into(),
            ty,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            default: None,
            max_len: None,
        }
    }

    #[inline]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[inline]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[inline]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[inline]
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[inline]
    pub fn max_len(mut self, max_len: u32) -> Self {
        self.max_len = Some(max_len);
        self
    }

    fn into_spec(self) -> Result<ColumnSpec> {
        let mut attr = ColumnAttributes::empty();
        attr.set(ColumnAttributes::NULLABLE, self.nullable);
        attr.set(ColumnAttributes::PRIMARY_KEY, self.primary_key);
        attr.set(ColumnAttributes::AUTO_INCREMENT, self.auto_increment);
        let mut spec = ColumnSpec::new(&self.name, self.ty, attr);
        if let Some(default) = self.default {
            // TOML has no date literal that maps to a plain date, so dates come as strings.
            let default = default.cast(self.ty).ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "default of column {} does not match type {}",
                    self.name, self.ty
                ))
            })?;
            spec = spec.default(default);
        }
        if let Some(max_len) = self.max_len {
            spec = spec.max_len(max_len);
        }
        Ok(spec)
    }
}
