use crate::db::errors::{DatabaseError, Result};
use crate::db::table::{ColumnType, TableDef};
use crate::db::value::{Record, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct SqlCall {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlCall {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }
}

/// What an UPDATE hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returning {
    /// Only the assigned columns
    Assigned,
    /// The whole row
    Row,
}

/// Parameters for an ordered, limited keyed read ("latest N", "top N")
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRead {
    pub key: String,
    pub value: Value,
    pub order_column: String,
    pub descending: bool,
    pub limit: i64,
    pub columns: Vec<String>,
}

impl OrderedRead {
    /// Ascending, one row, all columns
    pub fn new(key: impl Into<String>, value: impl Into<Value>, order_column: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            order_column: order_column.into(),
            descending: false,
            limit: 1,
            columns: Vec::new(),
        }
    }

    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape `%`, `_` and `\` so a user string matches literally inside LIKE
pub fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every catalogued column of `table`, quoted. Used in place of `*` so rows only
/// ever carry columns the definition knows how to decode.
pub fn column_list(table: &TableDef) -> String {
    table.column_names().map(quote_ident).collect::<Vec<_>>().join(", ")
}

fn select_list(table: &TableDef, columns: &[String]) -> Result<String> {
    if columns.is_empty() {
        return Ok(column_list(table));
    }
    table.check_columns(columns)?;
    Ok(columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "))
}

fn key_set(table: &TableDef, key: &str, values: &[Value]) -> Result<()> {
    for value in values {
        table.check_value(key, value)?;
    }
    Ok(())
}

pub fn generate_read_sql(table: &TableDef, key: &str, value: &Value, columns: &[String]) -> Result<SqlCall> {
    table.check_value(key, value)?;
    let query = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_list(table, columns)?,
        quote_ident(table.name),
        quote_ident(key)
    );
    Ok(SqlCall::new(query, vec![value.clone()]))
}

pub fn generate_read_ordered_sql(table: &TableDef, read: &OrderedRead) -> Result<SqlCall> {
    table.check_value(&read.key, &read.value)?;
    table.column(&read.order_column)?;
    if read.limit < 0 {
        return Err(DatabaseError::InvalidData(format!("negative limit {}", read.limit)));
    }
    let query = format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY {} {} LIMIT $2",
        select_list(table, &read.columns)?,
        quote_ident(table.name),
        quote_ident(&read.key),
        quote_ident(&read.order_column),
        if read.descending { "DESC" } else { "ASC" }
    );
    Ok(SqlCall::new(query, vec![read.value.clone(), Value::Int(read.limit)]))
}

pub fn generate_read_all_sql(table: &TableDef) -> SqlCall {
    SqlCall::new(
        format!("SELECT {} FROM {}", column_list(table), quote_ident(table.name)),
        vec![],
    )
}

pub fn generate_read_flagged_sql(table: &TableDef, flag_column: &str) -> Result<SqlCall> {
    let column = table.column(flag_column)?;
    if column.column_type != ColumnType::Bool {
        return Err(DatabaseError::InvalidData(format!(
            "column '{}.{}' is not boolean",
            table.name, flag_column
        )));
    }
    Ok(SqlCall::new(
        format!(
            "SELECT {} FROM {} WHERE {} IS TRUE",
            column_list(table),
            quote_ident(table.name),
            quote_ident(flag_column)
        ),
        vec![],
    ))
}

fn assignments(table: &TableDef, values: &Record) -> Result<(String, Vec<Value>)> {
    if values.is_empty() {
        return Err(DatabaseError::InvalidData(format!(
            "update on '{}' without any values",
            table.name
        )));
    }
    table.check_record(values)?;
    let set = values
        .keys()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", quote_ident(column), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    Ok((set, values.values().cloned().collect()))
}

fn returning_clause(table: &TableDef, values: &Record, returning: Returning) -> String {
    match returning {
        Returning::Row => column_list(table),
        Returning::Assigned => values.keys().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "),
    }
}

pub fn generate_update_sql(
    table: &TableDef,
    values: &Record,
    key: &str,
    value: &Value,
    returning: Returning,
) -> Result<SqlCall> {
    table.check_value(key, value)?;
    let (set, mut params) = assignments(table, values)?;
    let query = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quote_ident(table.name),
        set,
        quote_ident(key),
        params.len() + 1,
        returning_clause(table, values, returning)
    );
    params.push(value.clone());
    Ok(SqlCall::new(query, params))
}

/// `None` when there are no keys to touch
pub fn generate_bulk_update_sql(
    table: &TableDef,
    values: &Record,
    key: &str,
    keys: &[Value],
) -> Result<Option<SqlCall>> {
    table.column(key)?;
    key_set(table, key, keys)?;
    let (set, mut params) = assignments(table, values)?;
    if keys.is_empty() {
        return Ok(None);
    }
    let query = format!(
        "UPDATE {} SET {} WHERE {} IN ({})",
        quote_ident(table.name),
        set,
        quote_ident(key),
        placeholders(params.len() + 1, keys.len())
    );
    params.extend(keys.iter().cloned());
    Ok(Some(SqlCall::new(query, params)))
}

pub fn generate_insert_sql(table: &TableDef, values: &Record) -> Result<SqlCall> {
    if values.is_empty() {
        return Ok(SqlCall::new(
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {}",
                quote_ident(table.name),
                column_list(table)
            ),
            vec![],
        ));
    }
    table.check_record(values)?;
    let query = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote_ident(table.name),
        values.keys().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "),
        placeholders(1, values.len()),
        column_list(table)
    );
    Ok(SqlCall::new(query, values.values().cloned().collect()))
}

pub fn generate_delete_sql(table: &TableDef, key: &str, value: &Value) -> Result<SqlCall> {
    table.check_value(key, value)?;
    Ok(SqlCall::new(
        format!("DELETE FROM {} WHERE {} = $1", quote_ident(table.name), quote_ident(key)),
        vec![value.clone()],
    ))
}

/// `None` when the key set is empty
pub fn generate_bulk_delete_sql(table: &TableDef, key: &str, keys: &[Value]) -> Result<Option<SqlCall>> {
    table.column(key)?;
    key_set(table, key, keys)?;
    if keys.is_empty() {
        return Ok(None);
    }
    let query = format!(
        "DELETE FROM {} WHERE {} IN ({})",
        quote_ident(table.name),
        quote_ident(key),
        placeholders(1, keys.len())
    );
    Ok(Some(SqlCall::new(query, keys.to_vec())))
}

pub fn generate_exists_sql(table: &TableDef, key: &str, value: &Value) -> Result<SqlCall> {
    table.check_value(key, value)?;
    Ok(SqlCall::new(
        format!(
            "SELECT 1 FROM {} WHERE {} = $1 LIMIT 1 FOR UPDATE",
            quote_ident(table.name),
            quote_ident(key)
        ),
        vec![value.clone()],
    ))
}

/// Transaction-scoped advisory lock serializing upserts on one (table, key, value)
pub fn generate_upsert_lock_sql(table: &TableDef, key: &str, value: &Value) -> SqlCall {
    let lock_name = format!("{}:{}:{}", table.name, key, value.lock_key_fragment());
    SqlCall::new("SELECT pg_advisory_xact_lock(hashtext($1))", vec![Value::Text(lock_name)])
}

/// Row to insert when an upsert finds nothing: the key column plus `values`
pub fn upsert_insert_values(key: &str, value: &Value, values: &Record) -> Record {
    let mut row = values.clone();
    row.insert(key.to_string(), value.clone());
    row
}
