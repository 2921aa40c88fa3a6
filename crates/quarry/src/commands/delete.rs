//! The DELETE statement builder.

use quarry_core::Where;

use crate::error::{Error, Result};
use crate::table::Table;

/// Fluent DELETE builder bound to a table.
///
/// Shares the safety rule with Update: executing without a condition
/// while the database's safety flag is on is rejected.
#[must_use]
pub struct Delete<'a> {
    table: &'a Table,
    condition: Option<Where>,
}

impl<'a> Delete<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            condition: None,
        }
    }

    /// Adds the condition.
    pub fn where_clause(mut self, condition: Where) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Renders the exact SQL text. Never enforces the safety rule.
    #[must_use]
    pub fn get_value(&self) -> String {
        let mut sql = format!("DELETE FROM {}", self.table.name());
        if let Some(condition) = &self.condition {
            sql.push(' ');
            sql.push_str(&condition.render());
        }
        sql.push(';');
        sql
    }

    /// Executes the statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// [`Error::Safety`] when no condition was supplied and the owning
    /// database's safety flag is enabled, plus driver failures.
    pub async fn execute(self) -> Result<u64> {
        self.table.assert_prepared()?;
        if self.table.database().safe() && self.condition.is_none() {
            return Err(Error::Safety("Delete"));
        }
        let sql = self.get_value();
        let result = self.table.database().execute(&sql, &[], true, true).await?;
        Ok(result.rows_affected)
    }
}
