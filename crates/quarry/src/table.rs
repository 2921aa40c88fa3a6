//! Table metadata and schema preparation.

use std::collections::HashSet;
use std::sync::Arc;

use quarry_core::{Column, Constraint, SqlValue, ToSqlValue, UniqueGroup, Where};
use tracing::{info, warn};

use crate::commands::{Delete, Insert, Select, Update};
use crate::database::{text_of, Database};
use crate::error::{Error, Result};

/// A declared table bound to a database.
///
/// Construction aggregates the columns: PRIMARY and UNIQUE tags are
/// lifted into table-level clauses and stripped from the columns' own
/// tag sets so they are emitted exactly once. Statement entry points
/// refuse to run until [`Table::prepare`] has reconciled the declaration
/// against the live schema.
#[derive(Debug)]
pub struct Table {
    database: Arc<Database>,
    name: String,
    columns: Vec<Column>,
    primary: Vec<String>,
    uniques: Vec<UniqueGroup>,
    charset: Option<crate::charset::Charset>,
    prepared: bool,
}

impl Table {
    /// Declares a table from an explicit ordered column list.
    #[must_use]
    pub fn new(database: Arc<Database>, name: impl Into<String>, columns: Vec<Column>) -> Self {
        let charset = database.config().charset;
        let mut table = Self {
            database,
            name: name.into(),
            columns,
            primary: Vec::new(),
            uniques: Vec::new(),
            charset,
            prepared: false,
        };
        table.aggregate_constraints();
        table
    }

    fn aggregate_constraints(&mut self) {
        for column in &mut self.columns {
            if column.has_tag(Constraint::Primary) {
                self.primary.push(String::from(column.name()));
                column.strip_tag(Constraint::Primary);
            }
            if column.has_tag(Constraint::Unique) {
                self.uniques.push(UniqueGroup::new(&[column.name()]));
                column.strip_tag(Constraint::Unique);
            }
        }
    }

    /// Overrides the charset inherited from the database.
    #[must_use]
    pub const fn with_charset(mut self, charset: crate::charset::Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Adds a multi-column unique constraint.
    #[must_use]
    pub fn with_unique(mut self, unique: UniqueGroup) -> Self {
        self.uniques.push(unique);
        self
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The declared columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Names of the primary-key columns.
    #[must_use]
    pub fn primary(&self) -> &[String] {
        &self.primary
    }

    /// Whether `prepare()` has run.
    #[must_use]
    pub const fn prepared(&self) -> bool {
        self.prepared
    }

    pub(crate) fn assert_prepared(&self) -> Result<()> {
        if self.prepared {
            Ok(())
        } else {
            Err(Error::TableNotPrepared(self.name.clone()))
        }
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Looks a column up by name, failing when it is not declared.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`].
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get_column(name).ok_or_else(|| Error::UnknownColumn {
            column: String::from(name),
            table: self.name.clone(),
        })
    }

    /// Creates a foreign column referencing one of this table's columns.
    /// The new column derives its type from the referenced column; an
    /// omitted name defaults to `"<column> of <table>"`.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaMismatch`] when the referenced column is not
    /// declared here.
    pub fn reference(&self, column: &str, name: Option<&str>, cascade: bool) -> Result<Column> {
        let referenced = self.get_column(column).ok_or_else(|| {
            Error::SchemaMismatch(format!(
                "unable to find column {column} in table {}",
                self.name
            ))
        })?;
        let name = name.map_or_else(|| format!("{column} of {}", self.name), String::from);
        Ok(Column::foreign(name, &self.name, referenced, cascade))
    }

    /// Reconciles the declaration against the live schema.
    ///
    /// Creates the table when it does not exist; otherwise introspects it
    /// and requires the declared `(name, type)` column set to equal the
    /// live one, with no attempt at auto-migration. Charset reconciliation
    /// runs last and is non-fatal.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for a missing column declaration,
    /// [`Error::SchemaMismatch`] when declared and live columns disagree,
    /// plus driver and type-recognition failures.
    pub async fn prepare(&mut self) -> Result<()> {
        let show = format!(
            "SHOW TABLES FROM {db} WHERE Tables_in_{db} = '{}';",
            self.name,
            db = self.database.name()
        );
        let exists = !self
            .database
            .execute(&show, &[], true, false)
            .await?
            .rows
            .is_empty();

        if exists {
            let live = self.database.describe_table(&self.name).await?;
            if self.columns.is_empty() {
                // Adopt the live schema wholesale.
                self.columns = live;
                self.aggregate_constraints();
            } else {
                self.check_schema(&live)?;
            }
        } else {
            if self.columns.is_empty() {
                return Err(Error::Configuration(format!(
                    "no columns were declared and table {} does not exist",
                    self.name
                )));
            }
            let sql = self.create_table_sql()?;
            self.database.execute(&sql, &[], false, true).await?;
            info!(table = %self.name, "created table");
        }

        let name = self.name.clone();
        for column in &mut self.columns {
            column.bind(name.clone());
        }

        self.reconcile_charset().await;
        self.prepared = true;
        Ok(())
    }

    fn create_table_sql(&self) -> Result<String> {
        let mut clauses = Vec::with_capacity(self.columns.len() + 2);
        for column in &self.columns {
            clauses.push(column.definition_sql().map_err(Error::from)?);
        }
        if !self.primary.is_empty() {
            clauses.push(format!("PRIMARY KEY({})", self.primary.join(", ")));
        }
        for column in &self.columns {
            if let Some(refer) = column.references() {
                let mut clause = format!(
                    "FOREIGN KEY ({}) REFERENCES {}({})",
                    column.name(),
                    refer.table,
                    refer.column
                );
                if refer.cascade {
                    clause.push_str(" ON DELETE CASCADE");
                }
                clauses.push(clause);
            }
        }
        for unique in &self.uniques {
            clauses.push(unique.to_sql());
        }
        Ok(format!("CREATE TABLE {} ({});", self.name, clauses.join(", ")))
    }

    /// Order-independent (name, type) set comparison, with a pairwise
    /// diagnostic listing when the sets disagree.
    fn check_schema(&self, live: &[Column]) -> Result<()> {
        let declared: HashSet<&Column> = self.columns.iter().collect();
        let existing: HashSet<&Column> = live.iter().collect();
        if declared == existing {
            return Ok(());
        }

        let describe = |c: &&Column| format!("`{}` {}", c.name(), c.sql_type().name());
        let mut only_declared: Vec<String> =
            declared.difference(&existing).map(describe).collect();
        let mut only_existing: Vec<String> =
            existing.difference(&declared).map(describe).collect();
        only_declared.sort();
        only_existing.sort();

        let mut lines = Vec::new();
        for i in 0..only_declared.len().max(only_existing.len()) {
            lines.push(format!(
                "declared {} <-> existing {}",
                only_declared.get(i).map_or("(none)", String::as_str),
                only_existing.get(i).map_or("(none)", String::as_str)
            ));
        }
        let message = format!(
            "columns declared for table {} do not match the live schema:\n\t{}",
            self.name,
            lines.join("\n\t")
        );
        warn!(table = %self.name, "declared columns do not match the live schema");
        Err(Error::SchemaMismatch(message))
    }

    /// Table-level charset reconciliation: `ALTER` only on mismatch,
    /// failures logged and recovered.
    async fn reconcile_charset(&self) {
        let Some(charset) = self.charset else {
            return;
        };

        let query = format!(
            "SELECT TABLE_COLLATION FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = '{}';",
            self.name
        );
        let current = match self.database.execute(&query, &[], true, false).await {
            Ok(result) => result
                .rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next()),
            Err(_) => None,
        };
        if current.is_some_and(|v| text_of(&v) == charset.collation) {
            return;
        }

        let alter = format!(
            "ALTER TABLE {} CONVERT TO CHARACTER SET {} COLLATE {};",
            self.name, charset.name, charset.collation
        );
        if let Err(error) = self.database.execute(&alter, &[], false, true).await {
            warn!(table = %self.name, %error, "altering the table charset failed");
        }
    }

    /// Starts a SELECT against this table.
    #[must_use]
    pub fn select(&self) -> Select<'_> {
        Select::new(self)
    }

    /// Starts an INSERT against this table.
    #[must_use]
    pub fn insert(&self) -> Insert<'_> {
        Insert::new(self)
    }

    /// Starts an UPDATE against this table.
    #[must_use]
    pub fn update(&self) -> Update<'_> {
        Update::new(self)
    }

    /// Starts a DELETE against this table.
    #[must_use]
    pub fn delete(&self) -> Delete<'_> {
        Delete::new(self)
    }

    /// Update-or-insert composite: selects by the condition first,
    /// updates the matching rows when any exist, inserts the values
    /// otherwise. Two round trips; the check and the write are not
    /// atomic. Use [`Insert::or_update`] when a race-free native upsert
    /// is required.
    ///
    /// # Errors
    ///
    /// Same failure modes as the underlying select plus the chosen
    /// update or insert.
    pub async fn set<T: ToSqlValue>(
        &self,
        columns: &[&str],
        values: Vec<T>,
        condition: Option<Where>,
    ) -> Result<()> {
        let mut selection = self.select().columns(columns);
        if let Some(condition) = &condition {
            selection = selection.where_clause(condition.clone());
        }
        let existing = selection.fetch().await?;

        if existing.is_empty() {
            self.insert()
                .into_columns(columns)
                .values(values)
                .execute()
                .await?;
        } else {
            let mut update = self.update().to(columns, values);
            if let Some(condition) = condition {
                update = update.where_clause(condition);
            }
            update.execute().await?;
        }
        Ok(())
    }

    /// Number of rows currently in the table.
    ///
    /// # Errors
    ///
    /// Fails when the table is not prepared, the driver reports a
    /// failure, or the count cell comes back in a shape that is not a
    /// non-negative integer.
    pub async fn count_rows(&self) -> Result<u64> {
        self.assert_prepared()?;
        let sql = format!("SELECT COUNT(*) FROM {};", self.name);
        let result = self.database.execute(&sql, &[], true, false).await?;
        let cell = result
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| Error::Driver(String::from("count query returned no rows")))?;
        match cell {
            SqlValue::UInt(n) => Ok(*n),
            SqlValue::Int(n) => {
                u64::try_from(*n).map_err(|_| Error::Driver(format!("negative row count {n}")))
            }
            other => text_of(other).parse().map_err(|_| {
                Error::Driver(format!("malformed row count {}", other.to_sql_inline()))
            }),
        }
    }
}
