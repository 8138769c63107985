use std::collections::HashMap;

use crate::db::errors::{DatabaseError, Result};
use crate::db::value::{Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Int,
    BigInt,
    Float,
    Numeric,
    Text,
    Timestamp,
    TimestampTz,
    Json,
}

impl ColumnType {
    /// Whether a value can be written into a column of this type.
    /// NULL is accepted everywhere; nullability is left to the database.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::Bool, Value::Bool(_)) => true,
            (ColumnType::Int | ColumnType::BigInt, Value::Int(_)) => true,
            (ColumnType::Float, Value::Float(_) | Value::Int(_) | Value::Decimal(_)) => true,
            (ColumnType::Numeric, Value::Decimal(_) | Value::Int(_) | Value::Float(_)) => true,
            (ColumnType::Text, Value::Text(_)) => true,
            (ColumnType::Timestamp | ColumnType::TimestampTz, Value::Timestamp(_) | Value::TimestampTz(_)) => true,
            (ColumnType::Json, Value::Json(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }
}

/// Static description of a table: its name, primary key and typed columns.
///
/// Every identifier that ends up in generated SQL is resolved through one of
/// these definitions, so callers can only ever name columns that exist.
#[derive(Debug, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DatabaseError::unknown_column(self.name, name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Check that `value` fits `column`, returning the column on success
    pub fn check_value(&self, column: &str, value: &Value) -> Result<&Column> {
        let col = self.column(column)?;
        if !col.column_type.admits(value) {
            return Err(DatabaseError::InvalidData(format!(
                "value {:?} does not fit column '{}.{}' ({:?})",
                value, self.name, col.name, col.column_type
            )));
        }
        Ok(col)
    }

    pub fn check_record(&self, values: &Record) -> Result<()> {
        for (column, value) in values {
            self.check_value(column, value)?;
        }
        Ok(())
    }

    pub fn check_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<()> {
        for column in columns {
            self.column(column.as_ref())?;
        }
        Ok(())
    }
}

/// Explicit name to definition map, built once at startup
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<&'static str, &'static TableDef>,
}

impl TableRegistry {
    pub fn new(definitions: &[&'static TableDef]) -> Self {
        let tables = definitions.iter().map(|def| (def.name, *def)).collect();
        Self { tables }
    }

    pub fn get(&self, name: &str) -> Result<&'static TableDef> {
        self.tables
            .get(name)
            .copied()
            .ok_or_else(|| DatabaseError::UnknownTable(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tables.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
