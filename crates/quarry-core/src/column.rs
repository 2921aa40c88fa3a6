//! Column and constraint metadata.

use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::types::SqlType;
use crate::value::{SqlValue, ToSqlValue};

/// A column-level constraint tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// Part of the primary key. Extracted to a table-level
    /// `PRIMARY KEY(...)` clause during table aggregation.
    Primary,
    /// NOT NULL.
    NotNull,
    /// Single-column UNIQUE. Extracted to a table-level constraint during
    /// table aggregation.
    Unique,
    /// AUTO_INCREMENT.
    AutoIncrement,
}

impl Constraint {
    /// The SQL keyword for this tag.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY KEY",
            Self::NotNull => "NOT NULL",
            Self::Unique => "UNIQUE",
            Self::AutoIncrement => "AUTO_INCREMENT",
        }
    }
}

/// A table-level UNIQUE constraint over one or more columns, optionally
/// named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueGroup {
    /// Optional constraint name.
    pub name: Option<String>,
    /// Member column names, in declared order.
    pub columns: Vec<String>,
}

impl UniqueGroup {
    /// Creates an anonymous unique constraint over the given columns.
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            name: None,
            columns: columns.iter().map(|c| String::from(*c)).collect(),
        }
    }

    /// Creates a named unique constraint over the given columns.
    #[must_use]
    pub fn named(name: &str, columns: &[&str]) -> Self {
        Self {
            name: Some(String::from(name)),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
        }
    }

    /// Renders the constraint clause.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let cols = self.columns.join(", ");
        match &self.name {
            Some(name) => format!("CONSTRAINT {name} UNIQUE ({cols})"),
            None => format!("UNIQUE ({cols})"),
        }
    }
}

/// A foreign-key reference carried by a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRef {
    /// Referenced table name.
    pub table: String,
    /// Referenced column name.
    pub column: String,
    /// Whether deletes cascade from the referenced row.
    pub cascade: bool,
}

/// A named, typed, constrained field of a table.
///
/// Equality and hashing cover `(name, sql_type)` only; that pair is the
/// identity used by the schema-diff set operations.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    sql_type: SqlType,
    tags: Vec<Constraint>,
    default: Option<SqlValue>,
    ordinal: Option<u32>,
    table: Option<String>,
    references: Option<ForeignRef>,
}

impl Column {
    /// Creates a column with no tags.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            tags: Vec::new(),
            default: None,
            ordinal: None,
            table: None,
            references: None,
        }
    }

    /// Creates a column referencing another table's column. The type is
    /// derived from the referenced column; of the supplied tags only
    /// NOT NULL is meaningful on a foreign column and callers add it with
    /// [`Column::tag`].
    #[must_use]
    pub fn foreign(
        name: impl Into<String>,
        referenced_table: &str,
        referenced: &Column,
        cascade: bool,
    ) -> Self {
        let mut column = Self::new(name, referenced.sql_type);
        column.references = Some(ForeignRef {
            table: String::from(referenced_table),
            column: referenced.name.clone(),
            cascade,
        });
        column
    }

    /// Adds a constraint tag.
    #[must_use]
    pub fn tag(mut self, tag: Constraint) -> Self {
        if self.references.is_some() && tag != Constraint::NotNull {
            return self;
        }
        self.tags.push(tag);
        self
    }

    /// Adds several constraint tags in order.
    #[must_use]
    pub fn tags(mut self, tags: &[Constraint]) -> Self {
        for tag in tags {
            self = self.tag(*tag);
        }
        self
    }

    /// Sets an explicit default value.
    #[must_use]
    pub fn default_value<T: ToSqlValue>(mut self, value: T) -> Self {
        self.default = Some(value.to_sql_value());
        self
    }

    /// Sets an explicit ordinal for schema comparison diagnostics.
    #[must_use]
    pub const fn ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column's SQL type.
    #[must_use]
    pub const fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }

    /// Constraint tags currently carried by the column itself.
    #[must_use]
    pub fn constraint_tags(&self) -> &[Constraint] {
        &self.tags
    }

    /// Whether the column carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: Constraint) -> bool {
        self.tags.contains(&tag)
    }

    /// Removes the given tag, used during table aggregation when PRIMARY
    /// and UNIQUE are lifted into table-level clauses.
    pub fn strip_tag(&mut self, tag: Constraint) {
        self.tags.retain(|t| *t != tag);
    }

    /// The foreign reference, if this is a foreign column.
    #[must_use]
    pub const fn references(&self) -> Option<&ForeignRef> {
        self.references.as_ref()
    }

    /// Explicit ordinal, if declared.
    #[must_use]
    pub const fn order(&self) -> Option<u32> {
        self.ordinal
    }

    /// Name of the owning table, set when the table is prepared.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Binds the column to its owning table.
    pub fn bind(&mut self, table: impl Into<String>) {
        self.table = Some(table.into());
    }

    /// The effective default: the explicit default when given, otherwise
    /// the type's default when the column is NOT NULL.
    #[must_use]
    pub fn effective_default(&self) -> Option<SqlValue> {
        match &self.default {
            Some(value) => Some(value.clone()),
            None if self.has_tag(Constraint::NotNull) => Some(self.sql_type.default_value()),
            None => None,
        }
    }

    /// Casts a raw value through the column's type.
    ///
    /// # Errors
    ///
    /// Propagates the type's cast failure.
    pub fn cast(&self, value: &SqlValue) -> Result<SqlValue> {
        self.sql_type.cast(value)
    }

    /// Renders a value as inline literal text through the column's type.
    ///
    /// # Errors
    ///
    /// Propagates the type's cast failure.
    pub fn parse(&self, value: &SqlValue) -> Result<String> {
        self.sql_type.parse(value)
    }

    /// Renders the column-definition clause used in `CREATE TABLE`:
    /// name, type, type-level tags, column tags in declared order, then a
    /// DEFAULT clause if the column has one.
    ///
    /// # Errors
    ///
    /// Propagates a cast failure on the default value.
    pub fn definition_sql(&self) -> Result<String> {
        let mut sql = format!("{} {}", self.name, self.sql_type.ddl_name());
        for tag in self.sql_type.tags() {
            sql.push(' ');
            sql.push_str(tag);
        }
        for tag in &self.tags {
            sql.push(' ');
            sql.push_str(tag.keyword());
        }
        if let Some(default) = self.effective_default() {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.sql_type.parse(&default)?);
        }
        Ok(sql)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sql_type == other.sql_type
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.sql_type.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{INT64, STRING, UINT32};

    #[test]
    fn definition_clause_ordering() {
        let column = Column::new("ID", UINT32)
            .tags(&[Constraint::NotNull, Constraint::AutoIncrement]);
        assert_eq!(
            column.definition_sql().unwrap(),
            "ID INT UNSIGNED NOT NULL AUTO_INCREMENT DEFAULT 0"
        );
    }

    #[test]
    fn default_falls_back_only_when_not_null() {
        let plain = Column::new("Name", STRING);
        assert_eq!(plain.effective_default(), None);

        let required = Column::new("Name", STRING).tag(Constraint::NotNull);
        assert_eq!(
            required.effective_default(),
            Some(SqlValue::Text(String::new()))
        );

        let explicit = Column::new("Name", STRING).default_value("n/a");
        assert_eq!(
            explicit.definition_sql().unwrap(),
            "Name VARCHAR(255) DEFAULT 'n/a'"
        );
    }

    #[test]
    fn equality_is_name_and_type() {
        let a = Column::new("ID", INT64).tag(Constraint::Primary);
        let b = Column::new("ID", INT64);
        let c = Column::new("ID", STRING);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn foreign_column_derives_type_and_filters_tags() {
        let id = Column::new("ID", INT64).tag(Constraint::Primary);
        let fk = Column::foreign("Owner", "Users", &id, true)
            .tags(&[Constraint::NotNull, Constraint::Unique]);
        assert_eq!(*fk.sql_type(), INT64);
        assert!(fk.has_tag(Constraint::NotNull));
        assert!(!fk.has_tag(Constraint::Unique));
        let refer = fk.references().unwrap();
        assert_eq!(refer.table, "Users");
        assert_eq!(refer.column, "ID");
        assert!(refer.cascade);
    }

    #[test]
    fn unique_group_sql() {
        assert_eq!(UniqueGroup::new(&["A", "B"]).to_sql(), "UNIQUE (A, B)");
        assert_eq!(
            UniqueGroup::named("uq_ab", &["A", "B"]).to_sql(),
            "CONSTRAINT uq_ab UNIQUE (A, B)"
        );
    }
}
