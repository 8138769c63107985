// Bot-facing query facades. These never return errors: failures are logged
// and reported as None / false. The underlying RecordStore keeps the Result
// channel for callers that need to tell "nothing matched" from "failed".

pub mod discord_bot;
pub mod dmp_api;

pub use discord_bot::DiscordBotQueries;
pub use dmp_api::DmpApiQueries;

use tracing::error;

use crate::db::errors::Result;

/// Log a failed operation and collapse it to `None`
pub(crate) fn settle<T>(operation: &str, table: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(
                operation,
                table,
                sql_state = e.sql_state(),
                rejected_locally = e.is_rejected_locally(),
                error = %e,
                "Query failed"
            );
            None
        }
    }
}
