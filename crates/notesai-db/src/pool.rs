//! PostgreSQL pool settings and construction.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use notesai_core::{Error, Result};

/// Notes traffic is one user at a time; a handful of connections is plenty.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Pool settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// How long to wait for a free connection.
    pub connect_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Read `DB_MAX_CONNECTIONS` and `DB_CONNECT_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("DB_MAX_CONNECTIONS").ok().as_deref(),
            std::env::var("DB_CONNECT_TIMEOUT_SECS").ok().as_deref(),
        )
    }

    /// Build from raw setting values; missing, unparsable or zero values
    /// keep the default.
    fn from_values(max_connections: Option<&str>, connect_timeout_secs: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            max_connections: max_connections
                .and_then(|s| s.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
            connect_timeout: connect_timeout_secs
                .and_then(|s| s.trim().parse().ok())
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }
}

/// Connect a pool to `database_url`.
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}
