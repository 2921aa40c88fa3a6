//! Charset negotiation at the database and table level: DDL only on
//! mismatch, and failures recovered instead of blocking startup.

mod common;

use std::sync::Arc;

use common::{config, one_row, statements, text, users_columns, MockDriver};
use quarry::charset;
use quarry::{Database, DatabaseConfig, Table};

fn charset_config() -> DatabaseConfig {
    config().charset(charset::UTF8MB4)
}

#[tokio::test]
async fn database_charset_is_altered_on_mismatch() {
    let mock = MockDriver::new().on(
        "SELECT DEFAULT_COLLATION_NAME",
        one_row(vec![text("latin1_swedish_ci"), text("latin1")]),
    );
    let log = mock.log();
    let db = Arc::new(Database::new(charset_config(), Box::new(mock)).unwrap());

    let mut users = Table::new(db, "Users", users_columns());
    users.prepare().await.unwrap();

    assert!(statements(&log).contains(&String::from(
        "ALTER DATABASE Bank CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;"
    )));
}

#[tokio::test]
async fn matching_charsets_emit_no_ddl() {
    let mock = MockDriver::new()
        .on(
            "SELECT DEFAULT_COLLATION_NAME",
            one_row(vec![text("utf8mb4_unicode_ci"), text("utf8mb4")]),
        )
        .on(
            "SELECT TABLE_COLLATION",
            one_row(vec![text("utf8mb4_unicode_ci")]),
        );
    let log = mock.log();
    let db = Arc::new(Database::new(charset_config(), Box::new(mock)).unwrap());

    let mut users = Table::new(db, "Users", users_columns());
    users.prepare().await.unwrap();

    assert!(statements(&log).iter().all(|s| !s.starts_with("ALTER")));
}

#[tokio::test]
async fn table_charset_is_converted_on_mismatch() {
    let mock = MockDriver::new()
        .on(
            "SELECT DEFAULT_COLLATION_NAME",
            one_row(vec![text("utf8mb4_unicode_ci"), text("utf8mb4")]),
        )
        .on(
            "SELECT TABLE_COLLATION",
            one_row(vec![text("latin1_swedish_ci")]),
        );
    let log = mock.log();
    let db = Arc::new(Database::new(charset_config(), Box::new(mock)).unwrap());

    let mut users = Table::new(db, "Users", users_columns());
    users.prepare().await.unwrap();

    let sent = statements(&log);
    assert!(sent.iter().all(|s| !s.starts_with("ALTER DATABASE")));
    assert!(sent.contains(&String::from(
        "ALTER TABLE Users CONVERT TO CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;"
    )));
}

#[tokio::test]
async fn failed_charset_ddl_is_recovered() {
    let mock = MockDriver::new().fail_on("ALTER");
    let log = mock.log();
    let db = Arc::new(Database::new(charset_config(), Box::new(mock)).unwrap());

    let mut users = Table::new(db, "Users", users_columns());
    users.prepare().await.unwrap();

    assert!(users.prepared());
    // Both alters were attempted, failed, and recovered.
    let sent = statements(&log);
    assert!(sent.iter().any(|s| s.starts_with("ALTER DATABASE Bank")));
    assert!(sent.iter().any(|s| s.starts_with("ALTER TABLE Users")));
}
