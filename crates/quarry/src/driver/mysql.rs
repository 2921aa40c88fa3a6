//! MySQL driver over a single sqlx connection.

use async_trait::async_trait;
use quarry_core::SqlValue;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use tracing::debug;

use super::{Driver, ResultSet};
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// A [`Driver`] backed by one `sqlx::MySqlConnection`.
///
/// The connection is established by [`Driver::connect`] and replaced on
/// every reconnect; there is no pooling.
#[derive(Debug, Default)]
pub struct MySqlDriver {
    conn: Option<MySqlConnection>,
}

impl MySqlDriver {
    /// Creates a driver with no connection yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { conn: None }
    }

    fn connection(&mut self) -> Result<&mut MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| Error::Connection(String::from("driver has no connection")))
    }
}

#[async_trait]
impl Driver for MySqlDriver {
    async fn connect(&mut self, config: &DatabaseConfig) -> Result<()> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user);
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        if let Some(charset) = config.charset {
            options = options.charset(charset.name).collation(charset.collation);
        }
        self.conn = Some(options.connect().await?);
        Ok(())
    }

    async fn ping(&mut self) -> bool {
        match &mut self.conn {
            Some(conn) => conn.ping().await.is_ok(),
            None => false,
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn execute(
        &mut self,
        sql: &str,
        params: &[SqlValue],
        buffered: bool,
    ) -> Result<ResultSet> {
        // sqlx materializes fetched rows either way; the flag is part of
        // the portable contract and only changes behavior for drivers
        // that stream.
        let _ = buffered;
        let conn = self.connection()?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }

        if returns_rows(sql) {
            let rows = query.fetch_all(&mut *conn).await?;
            let mut decoded = Vec::with_capacity(rows.len());
            for row in &rows {
                decoded.push(decode_row(row)?);
            }
            debug!(rows = decoded.len(), "statement returned rows");
            Ok(ResultSet {
                rows: decoded,
                ..ResultSet::default()
            })
        } else {
            let done = query.execute(&mut *conn).await?;
            debug!(
                rows_affected = done.rows_affected(),
                last_insert_id = done.last_insert_id(),
                "statement executed"
            );
            Ok(ResultSet {
                rows: Vec::new(),
                last_insert_id: done.last_insert_id(),
                rows_affected: done.rows_affected(),
            })
        }
    }

    async fn commit(&mut self) -> Result<()> {
        let conn = self.connection()?;
        sqlx::query("COMMIT").execute(&mut *conn).await?;
        Ok(())
    }
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::UInt(n) => query.bind(*n),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::Bytes(b) => query.bind(b.as_slice()),
    }
}

fn returns_rows(sql: &str) -> bool {
    let head = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(head.as_str(), "SELECT" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN")
}

fn decode_row(row: &MySqlRow) -> Result<Vec<SqlValue>> {
    let mut values = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(index)?.is_null() {
            values.push(SqlValue::Null);
            continue;
        }
        let type_name = column.type_info().name();
        let value = match type_name {
            "BOOLEAN" => SqlValue::Bool(row.try_get(index)?),
            "FLOAT" | "DOUBLE" => SqlValue::Float(row.try_get_unchecked(index)?),
            "BIT" => SqlValue::Bytes(row.try_get_unchecked(index)?),
            name if name.contains("INT") && name.contains("UNSIGNED") => {
                SqlValue::UInt(row.try_get_unchecked(index)?)
            }
            name if name.contains("INT") || name == "YEAR" => {
                SqlValue::Int(row.try_get_unchecked(index)?)
            }
            name if name.contains("BLOB") || name.contains("BINARY") => {
                SqlValue::Bytes(row.try_get_unchecked(index)?)
            }
            _ => SqlValue::Text(row.try_get_unchecked(index)?),
        };
        values.push(value);
    }
    Ok(values)
}
