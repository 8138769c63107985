use chrono::Utc;

use crate::db::postgres::PostgresClient;
use crate::db::sql_generation::OrderedRead;
use crate::db::store::RecordStore;
use crate::db::table::{TableDef, TableRegistry};
use crate::db::value::{Record, Value};
use crate::domain::contributors::{bulk_sync_contributors, sync_contributor, CONTRIBUTOR_KEY};
use crate::models::tables::{CHAPTERS, CONTRIBUTORS_DISCORD, CONTRIBUTORS_REGISTRATION, LEADERBOARD, VC_LOGS};
use crate::models::{registry, MemberProfile};
use crate::queries::settle;

/// Queries used by the Discord bot's feature code
pub struct DiscordBotQueries<S = PostgresClient> {
    store: S,
    tables: TableRegistry,
}

impl<S: RecordStore> DiscordBotQueries<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tables: registry(),
        }
    }

    /// The underlying store, whose methods return `Result` instead of sentinels
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn table(&self, name: &str) -> Option<&'static TableDef> {
        settle("table", name, self.tables.get(name))
    }

    pub async fn read(&self, table: &TableDef, key: &str, value: impl Into<Value>, columns: &[String]) -> Option<Vec<Record>> {
        let value = value.into();
        settle("read", table.name, self.store.read(table, key, &value, columns).await)
    }

    pub async fn read_by_order_limit(&self, table: &TableDef, read: &OrderedRead) -> Option<Vec<Record>> {
        settle(
            "read_by_order_limit",
            table.name,
            self.store.read_ordered_limited(table, read).await,
        )
    }

    pub async fn read_all(&self, table_name: &str) -> Option<Vec<Record>> {
        let table = self.table(table_name)?;
        settle("read_all", table.name, self.store.read_all(table).await)
    }

    pub async fn read_all_active(&self, table_name: &str) -> Option<Vec<Record>> {
        let table = self.table(table_name)?;
        settle("read_all_active", table.name, self.store.read_flagged(table, "is_active").await)
    }

    pub async fn update(&self, table: &TableDef, values: &Record, key: &str, value: impl Into<Value>) -> Option<Record> {
        let value = value.into();
        settle("update", table.name, self.store.update(table, values, key, &value).await).flatten()
    }

    pub async fn insert(&self, table: &TableDef, values: &Record) -> Option<Record> {
        settle("insert", table.name, self.store.insert(table, values).await)
    }

    pub async fn upsert_by_key(&self, table: &TableDef, key: &str, value: impl Into<Value>, values: &Record) -> Option<Record> {
        let value = value.into();
        settle("upsert_by_key", table.name, self.store.upsert_by_key(table, key, &value, values).await)
    }

    /// True when at least one row was removed
    pub async fn delete_by_key(&self, table: &TableDef, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        settle("delete_by_key", table.name, self.store.delete_by_key(table, key, &value).await)
            .is_some_and(|deleted| deleted > 0)
    }

    /// True when the statement ran, whether or not any row matched
    pub async fn bulk_delete(&self, table: &TableDef, key: &str, keys: &[Value]) -> bool {
        settle("bulk_delete", table.name, self.store.bulk_delete(table, key, keys).await).is_some()
    }

    pub async fn log_vc_action(&self, discord_id: i64, discord_name: &str, action: &str) -> Option<Record> {
        let mut values = Record::new();
        values.insert("discord_id".to_string(), Value::from(discord_id));
        values.insert("discord_name".to_string(), Value::from(discord_name));
        values.insert("option".to_string(), Value::from(action));
        values.insert("created_at".to_string(), Value::from(Utc::now()));
        self.insert(&VC_LOGS, &values).await
    }

    pub async fn get_leaderboard(&self, discord_id: i64) -> Option<Vec<Record>> {
        self.read(&LEADERBOARD, "discord_id", discord_id, &[]).await
    }

    pub async fn member_is_authenticated(&self, discord_id: i64) -> bool {
        self.read(&CONTRIBUTORS_REGISTRATION, "discord_id", discord_id, &[])
            .await
            .is_some_and(|rows| !rows.is_empty())
    }

    pub async fn add_chapter(&self, discord_role_id: i64, org_name: &str, chapter_type: &str) -> Option<Record> {
        let mut values = Record::new();
        values.insert("org_name".to_string(), Value::from(org_name));
        values.insert("type".to_string(), Value::from(chapter_type));
        self.upsert_by_key(&CHAPTERS, "discord_role_id", discord_role_id, &values).await
    }

    pub async fn delete_chapter(&self, discord_role_id: i64) -> bool {
        self.delete_by_key(&CHAPTERS, "discord_role_id", discord_role_id).await
    }

    pub async fn update_contributor(&self, member: &MemberProfile) -> bool {
        settle(
            "update_contributor",
            CONTRIBUTORS_DISCORD.name,
            sync_contributor(&self.store, &CONTRIBUTORS_DISCORD, member).await,
        )
        .is_some()
    }

    pub async fn update_contributors(&self, members: &[MemberProfile]) -> bool {
        settle(
            "update_contributors",
            CONTRIBUTORS_DISCORD.name,
            bulk_sync_contributors(&self.store, &CONTRIBUTORS_DISCORD, members).await,
        )
        .is_some()
    }

    pub async fn delete_contributor_discord(&self, discord_ids: &[i64]) -> bool {
        let keys: Vec<Value> = discord_ids.iter().copied().map(Value::from).collect();
        self.bulk_delete(&CONTRIBUTORS_DISCORD, CONTRIBUTOR_KEY, &keys).await
    }

    /// Mark members inactive without deleting their rows
    pub async fn invalidate_contributor_discord(&self, discord_ids: &[i64]) -> bool {
        let keys: Vec<Value> = discord_ids.iter().copied().map(Value::from).collect();
        let mut values = Record::new();
        values.insert("is_active".to_string(), Value::Bool(false));
        settle(
            "invalidate_contributor_discord",
            CONTRIBUTORS_DISCORD.name,
            self.store
                .bulk_update(&CONTRIBUTORS_DISCORD, &values, CONTRIBUTOR_KEY, &keys)
                .await,
        )
        .is_some()
    }
}
