//! Connection provider seam and the PostgreSQL connection handle.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::config::{DatabaseConfig, IsolationLevel};
use crate::error::Result;

/// Supplies connections to the backing store.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Open a connection handle for one Unit-of-Work instance.
    async fn open(&self) -> Result<Connection>;
}

/// Handle to the backing store.
///
/// Statements run without a transaction are dispatched on a pooled
/// connection in autocommit mode; pooling is left to the driver.
#[derive(Clone, Debug)]
pub struct Connection {
    pool: PgPool,
    isolation_level: Option<IsolationLevel>,
}

impl Connection {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            isolation_level: None,
        }
    }

    pub fn with_isolation_level(mut self, level: Option<IsolationLevel>) -> Self {
        self.isolation_level = level;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction on this connection.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        if let Some(level) = self.isolation_level {
            sqlx::query(&level.set_transaction_sql())
                .execute(&mut *tx)
                .await?;
            debug!(isolation_level = level.as_sql(), "Applied isolation level");
        }
        Ok(tx)
    }

    pub(crate) async fn acquire(&self) -> Result<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }
}

/// `ConnectionProvider` backed by a `PgPool`.
#[derive(Clone, Debug)]
pub struct PgConnectionProvider {
    pool: PgPool,
    isolation_level: Option<IsolationLevel>,
}

impl PgConnectionProvider {
    /// Build the pool described by `config` and connect to it.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config).connect(&config.url).await?;
        debug!(
            max_connections = config.max_connections,
            "Connected to database"
        );
        Ok(Self {
            pool,
            isolation_level: config.isolation_level,
        })
    }

    /// Build the pool without opening any connection until first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config).connect_lazy(&config.url)?;
        Ok(Self {
            pool,
            isolation_level: config.isolation_level,
        })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            isolation_level: None,
        }
    }

    pub fn with_isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionProvider for PgConnectionProvider {
    async fn open(&self) -> Result<Connection> {
        Ok(Connection::new(self.pool.clone()).with_isolation_level(self.isolation_level))
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
}
