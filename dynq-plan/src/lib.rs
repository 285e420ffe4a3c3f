pub mod codec;
pub mod delete;
pub mod error;
pub mod select;
pub mod spec;
pub mod write;

pub use codec::*;
pub use delete::*;
pub use select::*;
pub use spec::*;
pub use write::*;
