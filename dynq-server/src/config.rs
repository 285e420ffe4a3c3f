use crate::error::{Error, Result};
use dynq_storage::config::EngineConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREATE_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveConfig {
    // maximum number of items in one save request.
    #[serde(default = "default_create_batch_size")]
    pub create_batch_size: usize,
}

impl Default for SaveConfig {
    #[inline]
    fn default() -> Self {
        SaveConfig {
            create_batch_size: DEFAULT_CREATE_BATCH_SIZE,
        }
    }
}

#[inline]
fn default_create_batch_size() -> usize {
    DEFAULT_CREATE_BATCH_SIZE
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub save: SaveConfig,
}

impl ServerConfig {
    #[inline]
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    #[inline]
    pub fn create_batch_size(mut self, create_batch_size: usize) -> Self {
        self.save.create_batch_size = create_batch_size;
        self
    }

    #[inline]
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}
