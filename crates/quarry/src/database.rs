//! The database handle.
//!
//! One logical connection, lazily established and re-established under
//! the configured reconnect policy. All statement builders call through
//! the single [`Database::execute`] primitive. Concurrent use is
//! serialized internally on the connection; logical phases (preparing a
//! table while statements run against it) are still the caller's
//! responsibility to sequence.

use std::sync::atomic::{AtomicBool, Ordering};

use quarry_core::{string_to_type, Column, Constraint, SqlValue};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::driver::{Driver, MySqlDriver, ResultSet};
use crate::error::{Error, Result};

/// A handle over one database and one logical connection.
pub struct Database {
    config: DatabaseConfig,
    driver: Mutex<Box<dyn Driver>>,
    safe: AtomicBool,
}

impl Database {
    /// Creates a handle over the given driver. No connection is made
    /// until the first statement executes.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when required parameters are missing.
    pub fn new(config: DatabaseConfig, driver: Box<dyn Driver>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            driver: Mutex::new(driver),
            safe: AtomicBool::new(true),
        })
    }

    /// Creates a handle backed by the bundled MySQL driver.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when required parameters are missing.
    pub fn mysql(config: DatabaseConfig) -> Result<Self> {
        Self::new(config, Box::new(MySqlDriver::new()))
    }

    /// Database (schema) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.database
    }

    /// The handle's configuration.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Whether destructive statements without a condition are rejected.
    #[must_use]
    pub fn safe(&self) -> bool {
        self.safe.load(Ordering::Relaxed)
    }

    /// Disables the safety guard when called with `confirm = true`;
    /// calling with `false` re-enables it.
    pub fn remove_safety(&self, confirm: bool) {
        self.safe.store(!confirm, Ordering::Relaxed);
    }

    /// Executes one statement through the driver, reconnecting first if
    /// the connection is down. Commits afterwards unless `auto_commit`
    /// is suppressed.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] when the retry policy is exhausted, or the
    /// driver's failure for the statement itself.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
        buffered: bool,
        auto_commit: bool,
    ) -> Result<ResultSet> {
        let mut driver = self.driver.lock().await;
        self.ensure_connected(driver.as_mut()).await?;

        debug!(sql, buffered, auto_commit, "executing statement");
        let result = driver.execute(sql, params, buffered).await?;
        if auto_commit {
            driver.commit().await?;
        }
        Ok(result)
    }

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Propagates the driver's failure.
    pub async fn commit(&self) -> Result<()> {
        let mut driver = self.driver.lock().await;
        self.ensure_connected(driver.as_mut()).await?;
        driver.commit().await
    }

    /// Introspects a live table via `DESCRIBE`, rebuilding each column
    /// through the type registry's reverse lookup.
    ///
    /// # Errors
    ///
    /// [`quarry_core::TypeError::Unrecognized`] (wrapped) when a reported
    /// type has no registered mapping.
    pub async fn describe_table(&self, table: &str) -> Result<Vec<Column>> {
        let sql = format!("DESCRIBE {}.{table};", self.name());
        let result = self.execute(&sql, &[], true, false).await?;

        let mut columns = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let name = text_at(row, 0);
            let sql_type = string_to_type(&text_at(row, 1))?;
            let mut column = Column::new(name, sql_type);
            if text_at(row, 2) == "NO" {
                column = column.tag(Constraint::NotNull);
            }
            if text_at(row, 3) == "PRI" {
                column = column.tag(Constraint::Primary);
            }
            match row.get(4) {
                Some(SqlValue::Null) | None => {}
                Some(value) => column = column.default_value(value.clone()),
            }
            columns.push(column);
        }
        Ok(columns)
    }

    async fn ensure_connected(&self, driver: &mut dyn Driver) -> Result<()> {
        if driver.is_connected() && driver.ping().await {
            return Ok(());
        }

        let mut attempt: u32 = 1;
        loop {
            info!(
                attempt = %ordinal(attempt),
                host = %self.config.host,
                database = %self.config.database,
                "attempting database connection"
            );
            match driver.connect(&self.config).await {
                Ok(()) => {
                    info!("connection was successful");
                    self.negotiate_charset(driver).await;
                    return Ok(());
                }
                Err(error) => {
                    warn!(%error, "connection failed");
                    if !self.config.auto_reconnect {
                        return Err(Error::Connection(error.to_string()));
                    }
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
            }
            attempt += 1;
        }
    }

    /// Database-level charset negotiation: compare the schema's default
    /// charset/collation with the desired one and `ALTER` only on
    /// mismatch. Failures here are recovered with a warning; a charset
    /// mismatch must not block startup.
    async fn negotiate_charset(&self, driver: &mut dyn Driver) {
        let Some(charset) = self.config.charset else {
            return;
        };

        let query = format!(
            "SELECT DEFAULT_COLLATION_NAME, DEFAULT_CHARACTER_SET_NAME \
             FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = '{}';",
            self.name()
        );
        let current = match driver.execute(&query, &[], true).await {
            Ok(result) => result.rows.into_iter().next(),
            Err(_) => None,
        };
        let in_sync = current.as_ref().is_some_and(|row| {
            row.first().is_some_and(|v| text_of(v) == charset.collation)
                && row.get(1).is_some_and(|v| text_of(v) == charset.name)
        });
        if in_sync {
            return;
        }

        let alter = format!(
            "ALTER DATABASE {} CHARACTER SET {} COLLATE {};",
            self.name(),
            charset.name,
            charset.collation
        );
        if let Err(error) = driver.execute(&alter, &[], false).await {
            warn!(%error, "altering the database charset failed");
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("database", &self.config.database)
            .field("host", &self.config.host)
            .field("safe", &self.safe())
            .finish_non_exhaustive()
    }
}

/// Display form of a raw cell, used by introspection and diagnostics.
pub(crate) fn text_of(value: &SqlValue) -> String {
    match value {
        SqlValue::Text(s) => s.clone(),
        SqlValue::Null => String::new(),
        other => other.to_sql_inline(),
    }
}

pub(crate) fn text_at(row: &[SqlValue], index: usize) -> String {
    row.get(index).map(text_of).unwrap_or_default()
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
