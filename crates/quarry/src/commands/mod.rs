//! Statement builders and typed results.
//!
//! Each builder is bound to a prepared [`crate::Table`], exposes a pure
//! `get_value()` returning the exact SQL text, and an async execute path
//! that goes through the owning database's single execute primitive.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

use quarry_core::{Column, SqlValue};

use crate::error::{Error, Result};

/// A materialized, typed result row keyed by column.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectData {
    table: String,
    data: Vec<(Column, SqlValue)>,
}

impl SelectData {
    /// Builds a row by casting each raw cell through its column's type.
    pub(crate) fn from_row(table: &str, columns: &[Column], row: &[SqlValue]) -> Result<Self> {
        if columns.len() != row.len() {
            return Err(Error::ValueCount {
                columns: columns.len(),
                values: row.len(),
            });
        }
        let mut data = Vec::with_capacity(row.len());
        for (column, raw) in columns.iter().zip(row) {
            data.push((column.clone(), column.cast(raw)?));
        }
        Ok(Self {
            table: String::from(table),
            data,
        })
    }

    /// Name of the table this row came from.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The cast value for a column.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`] when the row does not carry the column.
    pub fn get(&self, column: &str) -> Result<&SqlValue> {
        self.data
            .iter()
            .find(|(c, _)| c.name() == column)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::UnknownColumn {
                column: String::from(column),
                table: self.table.clone(),
            })
    }

    /// Iterates the row's columns and values in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&Column, &SqlValue)> {
        self.data.iter().map(|(c, v)| (c, v))
    }
}

/// The three-way shape of a select: an explicit empty marker, a single
/// row, or an ordered sequence. Callers are expected to branch on all
/// three.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectResult {
    /// The statement matched no rows.
    Empty,
    /// Exactly one row matched.
    One(SelectData),
    /// Two or more rows matched, in result order.
    Many(Vec<SelectData>),
}

impl SelectResult {
    pub(crate) fn shape(mut rows: Vec<SelectData>) -> Self {
        match rows.len() {
            0 => Self::Empty,
            1 => Self::One(rows.remove(0)),
            _ => Self::Many(rows),
        }
    }

    /// Whether the result is the empty marker.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of rows in the result.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(rows) => rows.len(),
        }
    }

    /// The first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&SelectData> {
        match self {
            Self::Empty => None,
            Self::One(row) => Some(row),
            Self::Many(rows) => rows.first(),
        }
    }

    /// Flattens the result into a vector of rows.
    #[must_use]
    pub fn into_vec(self) -> Vec<SelectData> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(row) => vec![row],
            Self::Many(rows) => rows,
        }
    }
}
