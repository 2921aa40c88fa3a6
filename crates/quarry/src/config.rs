//! Database connection configuration.
//!
//! An explicit configuration record passed to [`crate::Database`],
//! replacing any implicit configuration harvesting: every parameter is a
//! visible field with a fluent setter.

use std::time::Duration;

use crate::charset::Charset;
use crate::error::{Error, Result};

/// Connection parameters and policy for one database handle.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database (schema) name.
    pub database: String,
    /// User name.
    pub user: String,
    /// Password; required.
    pub password: Option<String>,
    /// Desired charset/collation, negotiated on connect when set.
    pub charset: Option<Charset>,
    /// Retry failed connections indefinitely instead of failing after one
    /// attempt.
    pub auto_reconnect: bool,
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
}

impl DatabaseConfig {
    /// Creates a configuration for the given database with local defaults
    /// (`127.0.0.1:3306`, user `root`).
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 3306,
            database: database.into(),
            user: String::from("root"),
            password: None,
            charset: None,
            auto_reconnect: true,
            reconnect_delay: Duration::from_secs(5),
        }
    }

    /// Sets the server host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the user name.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Sets the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the desired charset.
    #[must_use]
    pub const fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Enables or disables the unlimited-retry reconnect policy.
    #[must_use]
    pub const fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Sets the fixed delay between reconnect attempts.
    #[must_use]
    pub const fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Validates that the required parameters are present.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the database name or password is
    /// missing.
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(Error::Configuration(String::from(
                "database name is required",
            )));
        }
        if self.password.is_none() {
            return Err(Error::Configuration(String::from(
                "password is not provided",
            )));
        }
        Ok(())
    }
}
