pub mod db;
pub mod domain;
pub mod models;
pub mod queries;
pub mod telemetry;

pub use db::{DatabaseError, PostgresClient, Record, RecordStore, TableDef, Value};
pub use queries::{DiscordBotQueries, DmpApiQueries};
