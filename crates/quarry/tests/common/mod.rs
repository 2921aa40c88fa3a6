//! Scripted driver and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quarry::config::DatabaseConfig;
use quarry::driver::{Driver, ResultSet};
use quarry::error::{Error, Result};
use quarry_core::{types, Column, Constraint, SqlValue};

struct Script {
    prefix: String,
    result: ResultSet,
    once: bool,
    used: bool,
}

/// A driver answering from a prefix-matched script instead of a server.
///
/// Every executed statement (and commit) is appended to a shared log so
/// tests can assert on the exact SQL that reached the driver, and on what
/// never did.
pub struct MockDriver {
    scripts: Vec<Script>,
    failures: Vec<String>,
    log: Arc<Mutex<Vec<String>>>,
    connected: bool,
    failing_connects: usize,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            scripts: Vec::new(),
            failures: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            connected: false,
            failing_connects: 0,
        }
    }

    /// Answers every statement starting with `prefix` with `result`.
    pub fn on(mut self, prefix: &str, result: ResultSet) -> Self {
        self.scripts.push(Script {
            prefix: String::from(prefix),
            result,
            once: false,
            used: false,
        });
        self
    }

    /// Like [`MockDriver::on`], but the script entry answers only once.
    pub fn once(mut self, prefix: &str, result: ResultSet) -> Self {
        self.scripts.push(Script {
            prefix: String::from(prefix),
            result,
            once: true,
            used: false,
        });
        self
    }

    /// Fails every statement starting with `prefix`.
    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.failures.push(String::from(prefix));
        self
    }

    /// Makes the next `n` connection attempts fail.
    pub fn failing_connects(mut self, n: usize) -> Self {
        self.failing_connects = n;
        self
    }

    /// Shared handle over the statement log.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn connect(&mut self, _config: &DatabaseConfig) -> Result<()> {
        if self.failing_connects > 0 {
            self.failing_connects -= 1;
            return Err(Error::Driver(String::from("connection refused")));
        }
        self.connected = true;
        Ok(())
    }

    async fn ping(&mut self) -> bool {
        self.connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn execute(
        &mut self,
        sql: &str,
        _params: &[SqlValue],
        _buffered: bool,
    ) -> Result<ResultSet> {
        self.log.lock().unwrap().push(String::from(sql));
        if self.failures.iter().any(|prefix| sql.starts_with(prefix)) {
            return Err(Error::Driver(String::from("scripted statement failure")));
        }
        for script in &mut self.scripts {
            if script.used || !sql.starts_with(&script.prefix) {
                continue;
            }
            if script.once {
                script.used = true;
            }
            return Ok(script.result.clone());
        }
        Ok(ResultSet::default())
    }

    async fn commit(&mut self) -> Result<()> {
        self.log.lock().unwrap().push(String::from("COMMIT"));
        Ok(())
    }
}

pub fn config() -> DatabaseConfig {
    DatabaseConfig::new("Bank").password("pw")
}

pub fn rows(rows: Vec<Vec<SqlValue>>) -> ResultSet {
    ResultSet {
        rows,
        ..ResultSet::default()
    }
}

pub fn one_row(row: Vec<SqlValue>) -> ResultSet {
    rows(vec![row])
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

pub fn int(n: i64) -> SqlValue {
    SqlValue::Int(n)
}

/// A `DESCRIBE` 5-tuple the way the server reports one.
pub fn describe_row(name: &str, ty: &str, nullable: bool, primary: bool) -> Vec<SqlValue> {
    vec![
        text(name),
        text(ty),
        text(if nullable { "YES" } else { "NO" }),
        text(if primary { "PRI" } else { "" }),
        SqlValue::Null,
    ]
}

/// ID / Name / Balance, the declaration used across the tests.
pub fn users_columns() -> Vec<Column> {
    vec![
        Column::new("ID", types::INT64).tags(&[Constraint::Primary, Constraint::AutoIncrement]),
        Column::new("Name", types::STRING).tag(Constraint::NotNull),
        Column::new("Balance", types::INT),
    ]
}

pub const USERS_CREATE: &str = "CREATE TABLE Users (ID BIGINT AUTO_INCREMENT, \
     Name VARCHAR(255) NOT NULL DEFAULT '', Balance INT, PRIMARY KEY(ID));";

/// Statements that reached the driver, commits excluded.
pub fn statements(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|sql| *sql != "COMMIT")
        .cloned()
        .collect()
}
