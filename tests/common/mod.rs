#![allow(dead_code)]

use std::env;

use chrono::DateTime;
use community_db::db::{Column, ColumnType, PostgresClient, Record, TableDef, Value};
use community_db::models::MemberProfile;
use tokio_postgres::types::ToSql;

pub static WIDGETS: TableDef = TableDef {
    name: "test_widgets",
    primary_key: "id",
    columns: &[
        Column::new("id", ColumnType::BigInt),
        Column::new("owner_id", ColumnType::BigInt),
        Column::new("label", ColumnType::Text),
        Column::new("is_active", ColumnType::Bool),
        Column::new("weight", ColumnType::Int),
    ],
};

/// Catalogues only part of `test_tokens`; `token` and `issued_on` stay unknown
pub static TOKENS: TableDef = TableDef {
    name: "test_tokens",
    primary_key: "id",
    columns: &[
        Column::new("id", ColumnType::BigInt),
        Column::new("label", ColumnType::Text),
    ],
};

// Scratch copies of the platform tables, shaped like the catalogue. The
// username check gives the roster tests a row the server will refuse.
const CREATE_TABLES: &str = "
BEGIN;
SELECT pg_advisory_xact_lock(7341);
CREATE TABLE IF NOT EXISTS test_widgets (
    id BIGSERIAL PRIMARY KEY,
    owner_id BIGINT NOT NULL,
    label TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    weight INTEGER
);
CREATE TABLE IF NOT EXISTS test_tokens (
    id BIGSERIAL PRIMARY KEY,
    label TEXT,
    token UUID NOT NULL DEFAULT gen_random_uuid(),
    issued_on DATE NOT NULL DEFAULT CURRENT_DATE
);
CREATE TABLE IF NOT EXISTS contributors_discord (
    id BIGSERIAL PRIMARY KEY,
    discord_id BIGINT NOT NULL,
    github_id BIGINT,
    github_url TEXT,
    discord_username TEXT NOT NULL CHECK (discord_username <> ''),
    joined_at TIMESTAMP,
    email TEXT,
    field_name TEXT,
    chapter TEXT,
    gender TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE
);
CREATE TABLE IF NOT EXISTS dmp_orgs (
    id BIGSERIAL PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    name TEXT,
    description TEXT,
    link TEXT,
    repo_owner TEXT
);
CREATE TABLE IF NOT EXISTS dmp_issues (
    id BIGSERIAL PRIMARY KEY,
    issue_url TEXT,
    issue_number BIGINT,
    mentor_username TEXT,
    contributor_username TEXT,
    title TEXT,
    org_id BIGINT REFERENCES dmp_orgs (id) ON DELETE CASCADE,
    description TEXT,
    repo TEXT,
    repo_owner TEXT,
    year INTEGER
);
COMMIT;
";

/// Connect to `TEST_DATABASE_URL` and make sure the scratch tables exist
pub async fn setup() -> PostgresClient {
    let url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let client = PostgresClient::connect_url(&url).await.unwrap();

    let conn = client.pool().get().await.unwrap();
    conn.batch_execute(CREATE_TABLES).await.unwrap();
    client
}

/// Remove every widget owned by `owner_id` so each test starts clean
pub async fn reset_owner(client: &PostgresClient, owner_id: i64) {
    let conn = client.pool().get().await.unwrap();
    conn.execute("DELETE FROM test_widgets WHERE owner_id = $1", &[&owner_id])
        .await
        .unwrap();
}

/// Row count straight from the database, bypassing the accessor
pub async fn count_where(client: &PostgresClient, table: &str, column: &str, value: &Value) -> i64 {
    let conn = client.pool().get().await.unwrap();
    let query = format!("SELECT count(*) FROM {} WHERE {} = $1", table, column);
    let params: [&(dyn ToSql + Sync); 1] = [value];
    conn.query_one(query.as_str(), &params).await.unwrap().get(0)
}

pub fn widget(owner_id: i64, label: &str, weight: i32) -> Record {
    let mut record = Record::new();
    record.insert("owner_id".to_string(), Value::from(owner_id));
    record.insert("label".to_string(), Value::from(label));
    record.insert("weight".to_string(), Value::from(weight));
    record
}

pub fn member(discord_id: i64, username: &str, roles: &[&str]) -> MemberProfile {
    MemberProfile {
        discord_id,
        username: username.to_string(),
        display_name: username.to_uppercase(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        email: None,
        is_active: true,
        joined_at: DateTime::parse_from_rfc3339("2024-01-15T10:00:00+05:30").unwrap(),
    }
}
