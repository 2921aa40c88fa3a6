//! The INSERT statement builder.

use quarry_core::{Column, SqlValue, ToSqlValue};

use crate::error::{Error, Result};
use crate::table::Table;

/// Fluent INSERT builder bound to a table.
///
/// Values bind positionally to all table columns unless a subset is
/// selected with [`Insert::into_columns`]. The value count is checked
/// before any SQL is sent.
#[must_use]
pub struct Insert<'a> {
    table: &'a Table,
    columns: Option<Vec<String>>,
    values: Vec<SqlValue>,
    or_update: bool,
}

impl<'a> Insert<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            columns: None,
            values: Vec::new(),
            or_update: false,
        }
    }

    /// Binds values to an explicit column subset instead of all table
    /// columns.
    pub fn into_columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| String::from(*c)).collect());
        self
    }

    /// Supplies one value per bound column, in order.
    pub fn values<T: ToSqlValue>(mut self, values: Vec<T>) -> Self {
        self.values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self
    }

    /// Emits an `ON DUPLICATE KEY UPDATE` clause mirroring the same
    /// column/value pairs, turning the statement into a native upsert.
    pub const fn or_update(mut self) -> Self {
        self.or_update = true;
        self
    }

    fn bound_columns(&self) -> Result<Vec<Column>> {
        match &self.columns {
            None => Ok(self.table.columns().to_vec()),
            Some(names) => names
                .iter()
                .map(|name| self.table.column(name).cloned())
                .collect(),
        }
    }

    /// Renders the exact SQL text.
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

        let names: Vec<&str> = columns.iter().map(Column::name).collect();
        let mut literals = Vec::with_capacity(self.values.len());
        for (column, value) in columns.iter().zip(&self.values) {
            literals.push(column.parse(value).map_err(Error::from)?);
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.name(),
            names.join(", "),
            literals.join(", ")
        );
        if self.or_update {
            let pairs: Vec<String> = names
                .iter()
                .zip(&literals)
                .map(|(name, literal)| format!("{name} = {literal}"))
                .collect();
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&pairs.join(", "));
        }
        sql.push(';');
        Ok(sql)
    }

    /// Executes the statement and returns the generated identifier of the
    /// inserted row (0 when not applicable).
    ///
    /// # Errors
    ///
    /// Fails when the table is not prepared, the value count is wrong, a
    /// value refuses its column's cast, or the driver reports a failure.
    pub async fn execute(self) -> Result<u64> {
        self.table.assert_prepared()?;
        let sql = self.get_value()?;
        let result = self.table.database().execute(&sql, &[], true, true).await?;
        Ok(result.last_insert_id)
    }
}
