//! Statement builders end to end against a scripted driver.

mod common;

use std::sync::Arc;

use common::{config, int, one_row, statements, text, users_columns, MockDriver};
use quarry::driver::ResultSet;
use quarry::error::Error;
use quarry::{Database, SelectResult, Table};
use quarry_core::SqlValue;

async fn prepared_users(mock: MockDriver) -> Table {
    let db = Arc::new(Database::new(config(), Box::new(mock)).unwrap());
    let mut users = Table::new(db, "Users", users_columns());
    users.prepare().await.unwrap();
    users
}

#[tokio::test]
async fn insert_returns_the_generated_id() {
    let mock = MockDriver::new().on(
        "INSERT INTO",
        ResultSet {
            last_insert_id: 7,
            ..ResultSet::default()
        },
    );
    let log = mock.log();
    let users = prepared_users(mock).await;

    let id = users
        .insert()
        .values(vec![int(1), text("ada"), int(10)])
        .execute()
        .await
        .unwrap();

    assert_eq!(id, 7);
    assert!(statements(&log)
        .contains(&String::from("INSERT INTO Users (ID, Name, Balance) VALUES (1, 'ada', 10);")));
}

#[tokio::test]
async fn insert_value_count_mismatch_never_reaches_the_driver() {
    let mock = MockDriver::new();
    let log = mock.log();
    let users = prepared_users(mock).await;

    let error = users.insert().values(vec![1_i64]).execute().await.unwrap_err();

    assert!(matches!(
        error,
        Error::ValueCount { columns: 3, values: 1 }
    ));
    assert!(statements(&log).iter().all(|s| !s.starts_with("INSERT")));
}

#[tokio::test]
async fn insert_or_update_renders_the_upsert_clause() {
    let mock = MockDriver::new();
    let users = prepared_users(mock).await;

    let sql = users
        .insert()
        .into_columns(&["ID", "Balance"])
        .values(vec![1, 10])
        .or_update()
        .get_value()
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO Users (ID, Balance) VALUES (1, 10) \
         ON DUPLICATE KEY UPDATE ID = 1, Balance = 10;"
    );
}

#[tokio::test]
async fn select_renders_all_clauses_in_order() {
    let mock = MockDriver::new();
    let users = prepared_users(mock).await;

    let condition = users
        .column("Balance")
        .unwrap()
        .gt(5)
        .unwrap()
        .and(&users.column("Name").unwrap().eq("ada").unwrap());
    let sql = users
        .select()
        .where_clause(condition)
        .order_by(&["Balance"])
        .descending()
        .limit(10)
        .offset(5)
        .get_value()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT * FROM Users WHERE (Balance > 5 AND Name = 'ada') \
         ORDER BY Balance DESC LIMIT 10 OFFSET 5;"
    );
}

#[tokio::test]
async fn select_shapes_one_row_and_casts_cells() {
    let mock = MockDriver::new().on(
        "SELECT Name, Balance FROM Users",
        one_row(vec![text("ada"), text("10")]),
    );
    let users = prepared_users(mock).await;

    let condition = users.column("Name").unwrap().eq("ada").unwrap();
    let result = users
        .select()
        .columns(&["Name", "Balance"])
        .where_clause(condition)
        .fetch()
        .await
        .unwrap();

    let SelectResult::One(row) = result else {
        panic!("expected a single row");
    };
    // The text cell comes back cast through the column's integer type.
    assert_eq!(row.get("Balance").unwrap(), &SqlValue::Int(10));
    assert_eq!(row.get("Name").unwrap(), &text("ada"));
    assert!(matches!(
        row.get("Missing"),
        Err(Error::UnknownColumn { .. })
    ));
}

#[tokio::test]
async fn select_on_an_empty_table_is_the_empty_marker() {
    let mock = MockDriver::new();
    let users = prepared_users(mock).await;

    let result = users.select().fetch().await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.len(), 0);
    assert_eq!(users.select().fetch_one().await.unwrap(), None);
}

#[tokio::test]
async fn select_shapes_many_rows_in_order() {
    let mock = MockDriver::new().on(
        "SELECT",
        common::rows(vec![
            vec![int(1), text("ada"), int(10)],
            vec![int(2), text("bob"), int(20)],
        ]),
    );
    let users = prepared_users(mock).await;

    let result = users.select().fetch().await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(
        result.first().unwrap().get("Name").unwrap(),
        &text("ada")
    );

    let balances = users
        .select()
        .fetch_as(|row| row.get("Balance").unwrap().clone())
        .await
        .unwrap();
    assert_eq!(balances, vec![SqlValue::Int(10), SqlValue::Int(20)]);
}

#[tokio::test]
async fn unconditioned_update_trips_the_safety_guard() {
    let mock = MockDriver::new().on(
        "UPDATE",
        ResultSet {
            rows_affected: 2,
            ..ResultSet::default()
        },
    );
    let log = mock.log();
    let users = prepared_users(mock).await;

    let error = users
        .update()
        .to(&["Balance"], vec![99])
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Safety("Update")));
    assert!(statements(&log).iter().all(|s| !s.starts_with("UPDATE")));

    // The rendered text is still inspectable while the guard is up.
    assert_eq!(
        users.update().to(&["Balance"], vec![99]).get_value().unwrap(),
        "UPDATE Users SET Balance = 99;"
    );

    users.database().remove_safety(true);
    let affected = users
        .update()
        .to(&["Balance"], vec![99])
        .execute()
        .await
        .unwrap();
    assert_eq!(affected, 2);
}

#[tokio::test]
async fn conditioned_update_passes_the_safety_guard() {
    let mock = MockDriver::new().on(
        "UPDATE",
        ResultSet {
            rows_affected: 1,
            ..ResultSet::default()
        },
    );
    let log = mock.log();
    let users = prepared_users(mock).await;

    let condition = users.column("Name").unwrap().eq("ada").unwrap();
    let affected = users
        .update()
        .to(&["Balance"], vec![99])
        .where_clause(condition)
        .execute()
        .await
        .unwrap();

    assert_eq!(affected, 1);
    assert!(statements(&log)
        .contains(&String::from("UPDATE Users SET Balance = 99 WHERE Name = 'ada';")));
}

#[tokio::test]
async fn unconditioned_delete_trips_the_safety_guard() {
    let mock = MockDriver::new();
    let log = mock.log();
    let users = prepared_users(mock).await;

    assert!(matches!(
        users.delete().execute().await.unwrap_err(),
        Error::Safety("Delete")
    ));
    assert_eq!(users.delete().get_value(), "DELETE FROM Users;");
    assert!(statements(&log).iter().all(|s| !s.starts_with("DELETE")));

    users.database().remove_safety(true);
    users.delete().execute().await.unwrap();
    assert!(statements(&log).contains(&String::from("DELETE FROM Users;")));

    // The guard re-arms.
    users.database().remove_safety(false);
    assert!(users.delete().execute().await.is_err());
}

#[tokio::test]
async fn set_inserts_when_the_condition_matches_nothing() {
    let mock = MockDriver::new();
    let log = mock.log();
    let users = prepared_users(mock).await;

    let condition = users.column("Name").unwrap().eq("ada").unwrap();
    users
        .set(&["Balance"], vec![5], Some(condition))
        .await
        .unwrap();

    let sent = statements(&log);
    assert!(sent.contains(&String::from(
        "SELECT Balance FROM Users WHERE Name = 'ada';"
    )));
    assert!(sent.contains(&String::from("INSERT INTO Users (Balance) VALUES (5);")));
    assert!(sent.iter().all(|s| !s.starts_with("UPDATE")));
}

#[tokio::test]
async fn set_updates_when_the_condition_matches() {
    let mock = MockDriver::new().on("SELECT Balance", one_row(vec![int(3)]));
    let log = mock.log();
    let users = prepared_users(mock).await;

    let condition = users.column("Name").unwrap().eq("ada").unwrap();
    users
        .set(&["Balance"], vec![5], Some(condition))
        .await
        .unwrap();

    let sent = statements(&log);
    assert!(sent.contains(&String::from(
        "UPDATE Users SET Balance = 5 WHERE Name = 'ada';"
    )));
    assert!(sent.iter().all(|s| !s.starts_with("INSERT")));
}

#[tokio::test]
async fn count_rows_reads_the_aggregate() {
    let mock = MockDriver::new().on("SELECT COUNT(*)", one_row(vec![int(3)]));
    let log = mock.log();
    let users = prepared_users(mock).await;

    assert_eq!(users.count_rows().await.unwrap(), 3);
    assert!(statements(&log).contains(&String::from("SELECT COUNT(*) FROM Users;")));
}

#[tokio::test]
async fn count_rows_rejects_a_malformed_count() {
    let mock = MockDriver::new().on("SELECT COUNT(*)", one_row(vec![text("many")]));
    let users = prepared_users(mock).await;

    assert!(matches!(
        users.count_rows().await.unwrap_err(),
        Error::Driver(_)
    ));
}

#[tokio::test]
async fn out_of_range_values_are_rejected_at_render_time() {
    let mock = MockDriver::new();
    let users = prepared_users(mock).await;

    // Balance is a 32-bit column.
    let error = users
        .insert()
        .into_columns(&["Balance"])
        .values(vec![i64::from(i32::MAX) + 1])
        .get_value()
        .unwrap_err();
    assert!(matches!(error, Error::Type(_)));
}
