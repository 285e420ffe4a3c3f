pub mod compile;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod pred;

pub use compile::compile_filters;
pub use filter::*;
pub use pred::*;
