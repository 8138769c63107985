pub mod connection;
pub mod errors;
pub mod postgres;
pub mod sql_generation;
pub mod store;
pub mod table;
pub mod value;

pub use connection::*;
pub use errors::*;
pub use postgres::PostgresClient;
pub use sql_generation::{OrderedRead, SqlCall};
pub use store::RecordStore;
pub use table::{Column, ColumnType, TableDef, TableRegistry};
pub use value::{record_from_row, Record, Value};
