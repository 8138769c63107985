use std::fmt;

use crate::db::errors::{DatabaseError, Result};

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings composed from the POSTGRES_DB_* environment variables
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub pool_size: usize,
}

impl DbConfig {
    /// Load from the process environment. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DatabaseError::Config(format!("Required environment variable \"{}\" not set", var)))
        };

        let port = match lookup("POSTGRES_DB_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| DatabaseError::Config(format!("POSTGRES_DB_PORT '{}': {}", port, e)))?,
            None => DEFAULT_PORT,
        };
        let pool_size = match lookup("POSTGRES_DB_POOL_SIZE") {
            Some(size) => size
                .parse::<usize>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| DatabaseError::Config(format!("POSTGRES_DB_POOL_SIZE '{}' is not a positive integer", size)))?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            host: required("POSTGRES_DB_HOST")?,
            port,
            name: required("POSTGRES_DB_NAME")?,
            user: required("POSTGRES_DB_USER")?,
            password: required("POSTGRES_DB_PASS")?,
            pool_size,
        })
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }

    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.name)
            .host(&self.host)
            .port(self.port);
        pg_config
    }
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "postgresql://{}:***@{}:{}/{}", self.user, self.host, self.port, self.name)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}
