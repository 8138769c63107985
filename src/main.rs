use dotenv::dotenv;
use eyre::{eyre, Result};
use tracing::info;

use community_db::db::{DbConfig, PostgresClient};
use community_db::models::registry;
use community_db::queries::DiscordBotQueries;
use community_db::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = DbConfig::from_env()?;
    info!(%config, "Connecting to database");

    let client = PostgresClient::new(&config).await?;
    client.health_check().await?;

    let tables = registry();
    info!(tables = ?tables.names(), "Table registry loaded");

    let queries = DiscordBotQueries::new(client);
    let active = queries
        .read_all_active("contributors_discord")
        .await
        .ok_or_else(|| eyre!("Could not read active contributors"))?;
    info!(active = active.len(), "Active contributors");

    Ok(())
}
