//! # quarry-core
//!
//! The IO-free core of the quarry query-builder: a typed SQL value model,
//! a parametrized type registry, column/constraint metadata, and an
//! immutable condition algebra.
//!
//! ```rust
//! use quarry_core::{Column, Constraint, types};
//!
//! let id = Column::new("ID", types::INT64)
//!     .tags(&[Constraint::Primary, Constraint::AutoIncrement]);
//! let name = Column::new("Name", types::STRING).tag(Constraint::NotNull);
//!
//! let cond = name.eq("Alice").unwrap().and(&id.gt(10).unwrap());
//! assert_eq!(cond.render(), "WHERE (Name = 'Alice' AND ID > 10)");
//! ```

pub mod column;
pub mod cond;
pub mod error;
pub mod types;
pub mod value;

pub use column::{Column, Constraint, ForeignRef, UniqueGroup};
pub use cond::Where;
pub use error::TypeError;
pub use types::{string_to_type, SqlType};
pub use value::{SqlValue, ToSqlValue};
