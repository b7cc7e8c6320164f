//! Roster and engine-config loading plus authoring-time validation.

pub mod load;
pub mod schema;
pub mod validate;

pub use load::*;
pub use schema::*;
pub use validate::*;
