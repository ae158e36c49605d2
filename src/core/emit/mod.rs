pub mod json;
pub mod sql;

pub use json::JsonEmitter;
pub use sql::{CoordinatePolicy, SqlDialect, SqlEmitter};
