use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Query execution error: {0}")]
    QueryError(#[from] tokio_postgres::Error),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DatabaseError {
    pub fn unknown_column(table: &str, column: &str) -> Self {
        Self::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// True for errors raised before any statement reached the database
    pub fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            Self::UnknownTable(_) | Self::UnknownColumn { .. } | Self::InvalidData(_) | Self::Config(_)
        )
    }

    /// Postgres SQLSTATE, when the server reported one
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::QueryError(e) => e.code().map(|code| code.code()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_rejections() {
        assert!(DatabaseError::unknown_column("chapters", "nope").is_rejected_locally());
        assert!(DatabaseError::UnknownTable("nope".to_string()).is_rejected_locally());
        assert!(!DatabaseError::ConnectionError("down".to_string()).is_rejected_locally());
    }

    #[test]
    fn test_unknown_column_message() {
        let err = DatabaseError::unknown_column("vc_logs", "colour");
        assert_eq!(err.to_string(), "Unknown column 'colour' on table 'vc_logs'");
        assert_eq!(err.sql_state(), None);
    }
}
