//! The SELECT statement builder.

use quarry_core::{Column, Where};

use super::{SelectData, SelectResult};
use crate::error::Result;
use crate::table::Table;

/// Fluent SELECT builder bound to a table.
///
/// `get_value()` is pure and repeatable; `fetch()` executes and shapes
/// the result as [`SelectResult`], `fetch_one()` is the "just one" mode
/// yielding an option instead of the empty marker.
#[must_use]
pub struct Select<'a> {
    table: &'a Table,
    columns: Vec<String>,
    condition: Option<Where>,
    order: Vec<String>,
    descending: bool,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'a> Select<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            condition: None,
            order: Vec::new(),
            descending: false,
            limit: None,
            offset: None,
        }
    }

    /// Projects the given columns; absent or empty means `*`.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds the condition.
    pub fn where_clause(mut self, condition: Where) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Orders by the given columns.
    pub fn order_by(mut self, columns: &[&str]) -> Self {
        self.order = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Reverses the ordering direction.
    pub const fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Caps the number of returned rows.
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips the first `n` rows.
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// The columns used for casting the result: the projection, or all
    /// table columns when none was given.
    fn projected(&self) -> Result<Vec<Column>> {
        if self.columns.is_empty() {
            return Ok(self.table.columns().to_vec());
        }
        self.columns
            .iter()
            .map(|name| self.table.column(name).cloned())
            .collect()
    }

    /// Renders the exact SQL text.
    ///
    /// # Errors
    ///
    /// Fails when a projected or ordering column is not declared on the
    /// table.
    pub fn get_value(&self) -> Result<String> {
        let projection = if self.columns.is_empty() {
            String::from("*")
        } else {
            self.projected()?
                .iter()
                .map(|c| String::from(c.name()))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {projection} FROM {}", self.table.name());
        if let Some(condition) = &self.condition {
            sql.push(' ');
            sql.push_str(&condition.render());
        }
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|name| self.table.column(name).map(|c| String::from(c.name())))
                .collect::<Result<_>>()?;
            sql.push_str(" ORDER BY ");
            if self.descending {
                let descending: Vec<String> =
                    order.into_iter().map(|c| format!("{c} DESC")).collect();
                sql.push_str(&descending.join(", "));
            } else {
                sql.push_str(&order.join(", "));
            }
        }
        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }
        if let Some(n) = self.offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }
        sql.push(';');
        Ok(sql)
    }

    /// Executes the statement and shapes the result three ways: the
    /// explicit empty marker, a singleton, or an ordered sequence.
    ///
    /// # Errors
    ///
    /// Fails when the table is not prepared, a column is unknown, the
    /// driver reports a failure, or a cell refuses its column's cast.
    pub async fn fetch(self) -> Result<SelectResult> {
        self.table.assert_prepared()?;
        let columns = self.projected()?;
        let sql = self.get_value()?;

        let result = self
            .table
            .database()
            .execute(&sql, &[], false, false)
            .await?;

        let mut rows = Vec::with_capacity(result.rows.len());
        for raw in &result.rows {
            rows.push(SelectData::from_row(self.table.name(), &columns, raw)?);
        }
        Ok(SelectResult::shape(rows))
    }

    /// "Just one" mode: `None` for zero rows, otherwise the first row.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Select::fetch`].
    pub async fn fetch_one(self) -> Result<Option<SelectData>> {
        Ok(self.fetch().await?.into_vec().into_iter().next())
    }

    /// Executes and maps every row through the caller's function,
    /// producing strongly-typed results.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Select::fetch`].
    pub async fn fetch_as<T, F>(self, map: F) -> Result<Vec<T>>
    where
        F: Fn(SelectData) -> T,
    {
        Ok(self.fetch().await?.into_vec().into_iter().map(map).collect())
    }
}
