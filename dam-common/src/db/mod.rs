//! SQLite persistence for record schemas

pub mod dump;
pub mod init;
pub mod music;
pub mod recordings;
pub mod schema_sync;
pub mod table;

pub use init::*;
pub use schema_sync::{SchemaDiff, SchemaIntrospector, SchemaSync};
pub use table::{IndexDef, SqlValue, TableLayout};
