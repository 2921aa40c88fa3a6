//! The UPDATE statement builder.

use quarry_core::{Column, SqlValue, ToSqlValue, Where};

use crate::error::{Error, Result};
use crate::table::Table;

/// Fluent UPDATE builder bound to a table.
///
/// `get_value()` renders the SQL without tripping the safety guard, so
/// the generated text can always be inspected; only `execute()` rejects
/// an unconditioned update while the database's safety flag is on.
#[must_use]
pub struct Update<'a> {
    table: &'a Table,
    columns: Vec<String>,
    values: Vec<SqlValue>,
    condition: Option<Where>,
}

impl<'a> Update<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
            condition: None,
        }
    }

    /// Binds the column subset and their new values, positionally.
    pub fn to<T: ToSqlValue>(mut self, columns: &[&str], values: Vec<T>) -> Self {
        self.columns = columns.iter().map(|c| String::from(*c)).collect();
        self.values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self
    }

    /// Adds the condition.
    pub fn where_clause(mut self, condition: Where) -> Self {
        self.condition = Some(condition);
        self
    }

    fn bound_columns(&self) -> Result<Vec<Column>> {
        if self.columns.is_empty() {
            return Ok(self.table.columns().to_vec());
        }
        self.columns
            .iter()
            .map(|name| self.table.column(name).cloned())
            .collect()
    }

    /// Renders the exact SQL text. Never enforces the safety rule.
    ///
    /// # Errors
    ///
    /// [`Error::ValueCount`] when the value count does not match the
    /// bound columns, or a cast failure for a value.
    pub fn get_value(&self) -> Result<String> {
        let columns = self.bound_columns()?;
        if columns.len() != self.values.len() {
            return Err(Error::ValueCount {
                columns: columns.len(),
                values: self.values.len(),
            });
        }

        let mut pairs = Vec::with_capacity(columns.len());
        for (column, value) in columns.iter().zip(&self.values) {
            pairs.push(format!(
                "{} = {}",
                column.name(),
                column.parse(value).map_err(Error::from)?
            ));
        }

        let mut sql = format!("UPDATE {} SET {}", self.table.name(), pairs.join(", "));
        if let Some(condition) = &self.condition {
            sql.push(' ');
            sql.push_str(&condition.render());
        }
        sql.push(';');
        Ok(sql)
    }

    /// Executes the statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// [`Error::Safety`] when no condition was supplied and the owning
    /// database's safety flag is enabled; otherwise the same failure
    /// modes as [`Update::get_value`] plus driver failures.
    pub async fn execute(self) -> Result<u64> {
        self.table.assert_prepared()?;
        if self.table.database().safe() && self.condition.is_none() {
            return Err(Error::Safety("Update"));
        }
        let sql = self.get_value()?;
        let result = self.table.database().execute(&sql, &[], true, true).await?;
        Ok(result.rows_affected)
    }
}
