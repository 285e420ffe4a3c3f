pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod session;
pub mod table;
pub mod trx;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::database::*;
    pub use crate::engine::*;
    pub use crate::error::*;
    pub use crate::session::*;
    pub use crate::trx::*;
}
