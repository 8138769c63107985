use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::str::FromStr;
use tokio_postgres::types::ToSql;
use tokio_postgres::{GenericClient, NoTls};
use tracing::{debug, info};

use crate::db::connection::{DbConfig, DEFAULT_POOL_SIZE};
use crate::db::errors::{DatabaseError, Result};
use crate::db::sql_generation::{
    generate_bulk_delete_sql, generate_bulk_update_sql, generate_delete_sql, generate_exists_sql,
    generate_insert_sql, generate_read_all_sql, generate_read_flagged_sql, generate_read_ordered_sql,
    generate_read_sql, generate_update_sql, generate_upsert_lock_sql, upsert_insert_values, OrderedRead,
    Returning, SqlCall,
};
use crate::db::store::RecordStore;
use crate::db::table::TableDef;
use crate::db::value::{record_from_row, Record, Value};

#[derive(Debug, Clone)]
pub struct PostgresClient {
    pool: Pool,
}

fn params(call: &SqlCall) -> Vec<&(dyn ToSql + Sync)> {
    call.params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

async fn fetch_with<C: GenericClient + Sync>(client: &C, call: &SqlCall) -> Result<Vec<Record>> {
    let rows = client.query(call.query.as_str(), &params(call)).await?;
    rows.iter().map(record_from_row).collect()
}

async fn execute_with<C: GenericClient + Sync>(client: &C, call: &SqlCall) -> Result<u64> {
    Ok(client.execute(call.query.as_str(), &params(call)).await?)
}

/// Lock, check, then update or insert. Must run inside a transaction.
async fn upsert_with<C: GenericClient + Sync>(
    client: &C,
    table: &TableDef,
    key: &str,
    value: &Value,
    values: &Record,
) -> Result<Record> {
    execute_with(client, &generate_upsert_lock_sql(table, key, value)).await?;
    let existing = fetch_with(client, &generate_exists_sql(table, key, value)?).await?;

    let call = if existing.is_empty() {
        generate_insert_sql(table, &upsert_insert_values(key, value, values))?
    } else if values.is_empty() {
        generate_read_sql(table, key, value, &[])?
    } else {
        generate_update_sql(table, values, key, value, Returning::Row)?
    };

    fetch_with(client, &call).await?.into_iter().next().ok_or_else(|| {
        DatabaseError::TransactionError(format!(
            "upsert on '{}' by '{}' returned no row",
            table.name, key
        ))
    })
}

impl PostgresClient {
    pub async fn new(config: &DbConfig) -> Result<Self> {
        info!(database = %config, pool_size = config.pool_size, "Creating database connection pool");
        Self::from_pg_config(config.pg_config(), config.pool_size)
    }

    /// Connect from a `postgresql://` URL, used by tools and tests
    pub async fn connect_url(database_url: &str) -> Result<Self> {
        let pg_config = tokio_postgres::Config::from_str(database_url)
            .map_err(|e| DatabaseError::ConnectionError(format!("Invalid database URL: {}", e)))?;
        Self::from_pg_config(pg_config, DEFAULT_POOL_SIZE)
    }

    fn from_pg_config(pg_config: tokio_postgres::Config, max_size: usize) -> Result<Self> {
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);

        let pool = Pool::builder(mgr)
            .max_size(max_size)
            .build()
            .map_err(|e| DatabaseError::ConnectionError(format!("Failed to create pool: {}", e)))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    async fn fetch_call(&self, call: &SqlCall) -> Result<Vec<Record>> {
        debug!(query = %call.query, params = call.params.len(), "Running query");
        let conn = self.pool.get().await?;
        let client: &tokio_postgres::Client = &conn;
        fetch_with(client, call).await
    }

    async fn execute_call(&self, call: &SqlCall) -> Result<u64> {
        debug!(query = %call.query, params = call.params.len(), "Executing statement");
        let conn = self.pool.get().await?;
        let client: &tokio_postgres::Client = &conn;
        execute_with(client, call).await
    }
}

#[async_trait]
impl RecordStore for PostgresClient {
    #[tracing::instrument(skip(self, table, value, columns), fields(table = table.name))]
    async fn read(&self, table: &TableDef, key: &str, value: &Value, columns: &[String]) -> Result<Vec<Record>> {
        let call = generate_read_sql(table, key, value, columns)?;
        let records = self.fetch_call(&call).await?;
        debug!("Read {} rows from {}", records.len(), table.name);
        Ok(records)
    }

    #[tracing::instrument(skip(self, table, read), fields(table = table.name, key = %read.key, limit = read.limit))]
    async fn read_ordered_limited(&self, table: &TableDef, read: &OrderedRead) -> Result<Vec<Record>> {
        let call = generate_read_ordered_sql(table, read)?;
        self.fetch_call(&call).await
    }

    #[tracing::instrument(skip(self, table), fields(table = table.name))]
    async fn read_all(&self, table: &TableDef) -> Result<Vec<Record>> {
        self.fetch_call(&generate_read_all_sql(table)).await
    }

    #[tracing::instrument(skip(self, table), fields(table = table.name))]
    async fn read_flagged(&self, table: &TableDef, flag_column: &str) -> Result<Vec<Record>> {
        let call = generate_read_flagged_sql(table, flag_column)?;
        self.fetch_call(&call).await
    }

    #[tracing::instrument(skip(self, table, values, value), fields(table = table.name))]
    async fn update(&self, table: &TableDef, values: &Record, key: &str, value: &Value) -> Result<Option<Record>> {
        let call = generate_update_sql(table, values, key, value, Returning::Assigned)?;
        let updated = self.fetch_call(&call).await?;
        info!("Updated {} rows in {}", updated.len(), table.name);
        Ok(updated.into_iter().next())
    }

    #[tracing::instrument(skip(self, table, values, keys), fields(table = table.name, keys = keys.len()))]
    async fn bulk_update(&self, table: &TableDef, values: &Record, key: &str, keys: &[Value]) -> Result<u64> {
        let Some(call) = generate_bulk_update_sql(table, values, key, keys)? else {
            return Ok(0);
        };
        let updated = self.execute_call(&call).await?;
        info!("Updated {} rows in {}", updated, table.name);
        Ok(updated)
    }

    #[tracing::instrument(skip(self, table, values), fields(table = table.name))]
    async fn insert(&self, table: &TableDef, values: &Record) -> Result<Record> {
        let call = generate_insert_sql(table, values)?;
        let record = self.fetch_call(&call).await?.into_iter().next().ok_or_else(|| {
            DatabaseError::InvalidData(format!("insert into '{}' returned no row", table.name))
        })?;
        info!("Row inserted into {}", table.name);
        Ok(record)
    }

    #[tracing::instrument(skip(self, table, value), fields(table = table.name))]
    async fn delete_by_key(&self, table: &TableDef, key: &str, value: &Value) -> Result<u64> {
        let call = generate_delete_sql(table, key, value)?;
        let deleted = self.execute_call(&call).await?;
        info!("Deleted {} rows from {}", deleted, table.name);
        Ok(deleted)
    }

    #[tracing::instrument(skip(self, table, value, values), fields(table = table.name))]
    async fn upsert_by_key(&self, table: &TableDef, key: &str, value: &Value, values: &Record) -> Result<Record> {
        let mut conn = self.pool.get().await?;
        let client: &mut tokio_postgres::Client = &mut conn;
        let tx = client.transaction().await?;

        let record = upsert_with(&tx, table, key, value, values).await?;
        tx.commit().await?;

        info!("Upserted row in {} by {}", table.name, key);
        Ok(record)
    }

    #[tracing::instrument(skip(self, table, rows), fields(table = table.name, rows = rows.len()))]
    async fn upsert_many_by_key(&self, table: &TableDef, key: &str, rows: &[(Value, Record)]) -> Result<u64> {
        let mut conn = self.pool.get().await?;
        let client: &mut tokio_postgres::Client = &mut conn;
        let tx = client.transaction().await?;

        // Dropping the transaction on the error path rolls the whole batch back
        for (value, values) in rows {
            upsert_with(&tx, table, key, value, values).await?;
        }
        tx.commit().await?;

        info!("Upserted {} rows in {} by {}", rows.len(), table.name, key);
        Ok(rows.len() as u64)
    }

    #[tracing::instrument(skip(self, table, keys), fields(table = table.name, keys = keys.len()))]
    async fn bulk_delete(&self, table: &TableDef, key: &str, keys: &[Value]) -> Result<u64> {
        let Some(call) = generate_bulk_delete_sql(table, key, keys)? else {
            return Ok(0);
        };
        let deleted = self.execute_call(&call).await?;
        info!("Deleted {} rows from {}", deleted, table.name);
        Ok(deleted)
    }

    async fn fetch(&self, call: &SqlCall) -> Result<Vec<Record>> {
        self.fetch_call(call).await
    }
}
