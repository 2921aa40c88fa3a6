//! The condition (WHERE) algebra.
//!
//! A [`Where`] wraps a finalized boolean SQL fragment. Comparison
//! constructors live on [`Column`] so every value is rendered through the
//! column's type; combinators wrap both operands in one outer pair of
//! parentheses, which keeps precedence correct under arbitrary nesting.
//! Values are immutable: combinators return new conditions, so a
//! sub-condition can be reused across composite expressions.

use crate::column::Column;
use crate::error::Result;
use crate::value::ToSqlValue;

/// An immutable boolean SQL expression fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Where {
    expr: String,
}

impl Where {
    /// Wraps an already-rendered boolean fragment.
    #[must_use]
    pub fn from_fragment(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }

    /// The bare fragment, without the `WHERE` keyword.
    #[must_use]
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Renders the full clause, prefixed with `WHERE `.
    #[must_use]
    pub fn render(&self) -> String {
        format!("WHERE {}", self.expr)
    }

    /// Conjunction of two conditions.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        Self::from_fragment(format!("({} AND {})", self.expr, other.expr))
    }

    /// Disjunction of two conditions.
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        Self::from_fragment(format!("({} OR {})", self.expr, other.expr))
    }

    /// Negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        Self::from_fragment(format!("NOT {}", self.expr))
    }
}

impl Column {
    fn comparison<T: ToSqlValue>(&self, op: &str, value: T) -> Result<Where> {
        let literal = self.parse(&value.to_sql_value())?;
        Ok(Where::from_fragment(format!(
            "{} {op} {literal}",
            self.name()
        )))
    }

    /// `column = value`.
    ///
    /// # Errors
    ///
    /// Fails when the value does not cast through the column's type.
    pub fn eq<T: ToSqlValue>(&self, value: T) -> Result<Where> {
        self.comparison("=", value)
    }

    /// `column <> value`.
    ///
    /// # Errors
    ///
    /// Fails when the value does not cast through the column's type.
    pub fn ne<T: ToSqlValue>(&self, value: T) -> Result<Where> {
        self.comparison("<>", value)
    }

    /// `column > value`.
    ///
    /// # Errors
    ///
    /// Fails when the value does not cast through the column's type.
    pub fn gt<T: ToSqlValue>(&self, value: T) -> Result<Where> {
        self.comparison(">", value)
    }

    /// `column >= value`.
    ///
    /// # Errors
    ///
    /// Fails when the value does not cast through the column's type.
    pub fn gt_eq<T: ToSqlValue>(&self, value: T) -> Result<Where> {
        self.comparison(">=", value)
    }

    /// `column < value`.
    ///
    /// # Errors
    ///
    /// Fails when the value does not cast through the column's type.
    pub fn lt<T: ToSqlValue>(&self, value: T) -> Result<Where> {
        self.comparison("<", value)
    }

    /// `column <= value`.
    ///
    /// # Errors
    ///
    /// Fails when the value does not cast through the column's type.
    pub fn lt_eq<T: ToSqlValue>(&self, value: T) -> Result<Where> {
        self.comparison("<=", value)
    }

    /// `column LIKE pattern`.
    ///
    /// # Errors
    ///
    /// Fails when the pattern does not cast through the column's type.
    pub fn like<T: ToSqlValue>(&self, pattern: T) -> Result<Where> {
        self.comparison("LIKE", pattern)
    }

    /// `column IN (v1, v2, ...)` — every element is parsed individually
    /// through the column's type.
    ///
    /// # Errors
    ///
    /// Fails when any element does not cast.
    pub fn is_in<T: ToSqlValue>(&self, values: Vec<T>) -> Result<Where> {
        let literals: Result<Vec<String>> = values
            .into_iter()
            .map(|v| self.parse(&v.to_sql_value()))
            .collect();
        Ok(Where::from_fragment(format!(
            "{} IN ({})",
            self.name(),
            literals?.join(", ")
        )))
    }

    /// `column BETWEEN low AND high`.
    ///
    /// # Errors
    ///
    /// Fails when either bound does not cast.
    pub fn between<T: ToSqlValue, U: ToSqlValue>(&self, low: T, high: U) -> Result<Where> {
        let low = self.parse(&low.to_sql_value())?;
        let high = self.parse(&high.to_sql_value())?;
        Ok(Where::from_fragment(format!(
            "{} BETWEEN {low} AND {high}",
            self.name()
        )))
    }
}
