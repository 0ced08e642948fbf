pub mod common;
pub mod document;
pub mod error;
pub mod options;
pub mod pagination;
pub mod record;
pub mod repository;
pub mod view_vars;

pub use common::*;
pub use document::*;
pub use error::*;
pub use options::*;
pub use pagination::*;
pub use record::*;
pub use repository::*;
pub use view_vars::*;
