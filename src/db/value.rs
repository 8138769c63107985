use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::Row;

use crate::db::errors::{DatabaseError, Result};

/// A single row as a column name to value mapping
pub type Record = BTreeMap<String, Value>;

/// Scalar cell value that can be bound as a parameter or decoded from a row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Decimal(d) => d.to_i64(),
            _ => None,
        }
    }

    /// Stable textual form used for advisory lock keys and log fields
    pub fn lock_key_fragment(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Decimal(d) => d.normalize().to_string(),
            Value::Text(s) => s.clone(),
            Value::Timestamp(ts) => ts.to_string(),
            Value::TimestampTz(ts) => ts.to_rfc3339(),
            Value::Json(v) => v.to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::TimestampTz(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// Integer and timestamp values are narrowed or widened to whatever the
// prepared statement expects for the parameter slot.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::from_f64(*v)
                    .ok_or_else(|| format!("{} cannot be represented as NUMERIC", v))?
                    .to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Decimal(d) => match *ty {
                Type::FLOAT8 => d
                    .to_f64()
                    .ok_or_else(|| format!("{} cannot be represented as FLOAT8", d))?
                    .to_sql(ty, out),
                _ => d.to_sql(ty, out),
            },
            Value::Text(s) => s.to_sql(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMPTZ => ts.and_utc().to_sql(ty, out),
                _ => ts.to_sql(ty, out),
            },
            Value::TimestampTz(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql(ty, out),
                _ => ts.to_sql(ty, out),
            },
            Value::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Convert a result row into a `Record`, decoding each column by its Postgres type
pub fn record_from_row(row: &Row) -> Result<Record> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = value_at(row, idx, column.type_()).map_err(|e| match e {
            DatabaseError::InvalidData(msg) => {
                DatabaseError::InvalidData(format!("column '{}': {}", column.name(), msg))
            }
            other => other,
        })?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn value_at(row: &Row, idx: usize, ty: &Type) -> Result<Value> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(|v| Value::Int(v.into())),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(|v| Value::Int(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(|v| Value::Float(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
        Type::NUMERIC => row.try_get::<_, Option<Decimal>>(idx)?.map(Value::Decimal),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
        }
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(idx)?.map(Value::Timestamp),
        Type::TIMESTAMPTZ => row.try_get::<_, Option<DateTime<Utc>>>(idx)?.map(Value::TimestampTz),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<serde_json::Value>>(idx)?.map(Value::Json),
        _ => return Err(DatabaseError::InvalidData(format!("unsupported column type {}", ty))),
    };
    Ok(value.unwrap_or(Value::Null))
}
