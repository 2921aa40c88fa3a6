//! Typed MySQL access with declared schemas.
//!
//! The crate layers statement execution on top of the IO-free
//! [`quarry_core`] builders. A [`Database`] owns one logical connection
//! behind a pluggable [`driver::Driver`]; a [`Table`] is declared in code
//! column by column and reconciled against the live schema with
//! [`Table::prepare`] before any statement may run against it.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use quarry::{Database, DatabaseConfig, Table};
//! use quarry_core::{types, Column, Constraint};
//!
//! # async fn demo() -> quarry::Result<()> {
//! let config = DatabaseConfig::new("Bank")
//!     .password("hunter2")
//!     .charset(quarry::charset::UTF8MB4);
//! let db = Arc::new(Database::mysql(config)?);
//!
//! let mut users = Table::new(
//!     db,
//!     "Users",
//!     vec![
//!         Column::new("ID", types::INT64).tags(&[Constraint::Primary, Constraint::AutoIncrement]),
//!         Column::new("Name", types::STRING).tag(Constraint::NotNull),
//!     ],
//! );
//! users.prepare().await?;
//!
//! let id = users.insert().into_columns(&["Name"]).values(vec!["ada"]).execute().await?;
//! println!("inserted row {id}");
//! # Ok(())
//! # }
//! ```

pub mod charset;
pub mod commands;
pub mod config;
pub mod database;
pub mod driver;
pub mod error;
pub mod table;

pub use charset::Charset;
pub use commands::{Delete, Insert, Select, SelectData, SelectResult, Update};
pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{Error, Result};
pub use table::Table;
