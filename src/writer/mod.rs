pub mod schema_gen;
pub mod sqlite;
pub mod value;

pub use sqlite::*;
pub use value::SqlValue;
