pub mod config;
pub mod error;
pub mod service;

pub use config::*;
pub use service::*;
