//! The driver boundary.
//!
//! Everything above this module depends only on the [`Driver`] trait: a
//! connect/ping/execute/commit contract over one logical connection. The
//! bundled [`MySqlDriver`] implements it with sqlx; tests script it with a
//! mock.

mod mysql;

pub use mysql::MySqlDriver;

use async_trait::async_trait;
use quarry_core::SqlValue;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Raw result of one executed statement.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Raw rows, one value per selected column.
    pub rows: Vec<Vec<SqlValue>>,
    /// Generated identifier of the last inserted row, 0 when not
    /// applicable.
    pub last_insert_id: u64,
    /// Rows affected by a mutating statement.
    pub rows_affected: u64,
}

/// A narrow, portable database driver contract.
#[async_trait]
pub trait Driver: Send {
    /// Establishes the connection described by the configuration,
    /// replacing any previous connection.
    async fn connect(&mut self, config: &DatabaseConfig) -> Result<()>;

    /// Liveness probe for the current connection.
    async fn ping(&mut self) -> bool;

    /// Whether a connection has been established at all.
    fn is_connected(&self) -> bool;

    /// Executes one statement with bound parameters and returns the raw
    /// result. `buffered` requests that the full result set be
    /// materialized before returning.
    async fn execute(&mut self, sql: &str, params: &[SqlValue], buffered: bool)
        -> Result<ResultSet>;

    /// Commits the current transaction.
    async fn commit(&mut self) -> Result<()>;
}
