use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::db::errors::Result;
use crate::db::sql_generation::{OrderedRead, SqlCall};
use crate::db::table::TableDef;
use crate::db::value::{Record, Value};

/// Generic keyed access to any table described by a [`TableDef`].
///
/// Every method reports failures through `Result`. "Nothing matched" is never
/// an error: reads return an empty vec and `update` returns `None`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows where `key = value`; an empty `columns` selects every column
    async fn read(&self, table: &TableDef, key: &str, value: &Value, columns: &[String]) -> Result<Vec<Record>>;

    async fn read_ordered_limited(&self, table: &TableDef, read: &OrderedRead) -> Result<Vec<Record>>;

    async fn read_all(&self, table: &TableDef) -> Result<Vec<Record>>;

    /// Rows where a boolean column is true
    async fn read_flagged(&self, table: &TableDef, flag_column: &str) -> Result<Vec<Record>>;

    /// Assigned columns of the first updated row, `None` when nothing matched
    async fn update(&self, table: &TableDef, values: &Record, key: &str, value: &Value) -> Result<Option<Record>>;

    async fn bulk_update(&self, table: &TableDef, values: &Record, key: &str, keys: &[Value]) -> Result<u64>;

    async fn insert(&self, table: &TableDef, values: &Record) -> Result<Record>;

    /// Number of removed rows
    async fn delete_by_key(&self, table: &TableDef, key: &str, value: &Value) -> Result<u64>;

    /// Update the row with `key = value` in place, or insert one built from
    /// `key`, `value` and `values`. Returns the resulting row.
    async fn upsert_by_key(&self, table: &TableDef, key: &str, value: &Value, values: &Record) -> Result<Record>;

    /// `upsert_by_key` for each `(value, values)` pair, all in one transaction
    async fn upsert_many_by_key(&self, table: &TableDef, key: &str, rows: &[(Value, Record)]) -> Result<u64>;

    async fn bulk_delete(&self, table: &TableDef, key: &str, keys: &[Value]) -> Result<u64>;

    /// Run a generated reporting query
    async fn fetch(&self, call: &SqlCall) -> Result<Vec<Record>>;
}
