//! The SQL type registry.
//!
//! A [`SqlType`] is a named, optionally parametrized value domain. It owns
//! three contracts: the exact DDL fragment emitted when creating a column,
//! a `cast` narrowing a raw value into canonical form, and a `parse`
//! rendering a canonical value as inline literal text. Two types are equal
//! iff their base name and ordered parameters match, which is what the
//! schema reconciliation diff relies on.

use crate::error::{Result, TypeError};
use crate::value::SqlValue;

/// A SQL value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// Fixed-width integer. Signed widths accept `[-2^(N-1), 2^(N-1)-1]`,
    /// unsigned widths `[0, 2^N-1]`, both ends inclusive.
    Int {
        /// Bit width (8, 16, 24, 32 or 64).
        bits: u8,
        /// Whether the column is UNSIGNED.
        unsigned: bool,
    },
    /// Single-precision float.
    Float,
    /// Double-precision float with display size and decimal places.
    Double {
        /// Total digits.
        size: u32,
        /// Digits after the decimal point.
        dec: u32,
    },
    /// Exact decimal with precision and scale.
    Decimal {
        /// Total digits.
        size: u32,
        /// Digits after the decimal point.
        dec: u32,
    },
    /// Fixed-length character string.
    Char {
        /// Declared length.
        size: u32,
    },
    /// Variable-length character string.
    Varchar {
        /// Declared maximum length.
        size: u32,
    },
    /// Bit field of the given width.
    Bit {
        /// Bit width (1..=64).
        size: u32,
    },
    /// Boolean, modeled as a 1-bit value rendering `1`/`0`.
    Bool,
}

/// 8-bit signed integer (`TINYINT`).
pub const INT8: SqlType = SqlType::Int { bits: 8, unsigned: false };
/// 16-bit signed integer (`SMALLINT`).
pub const INT16: SqlType = SqlType::Int { bits: 16, unsigned: false };
/// 24-bit signed integer (`MEDIUMINT`).
pub const INT24: SqlType = SqlType::Int { bits: 24, unsigned: false };
/// 32-bit signed integer (`INT`).
pub const INT32: SqlType = SqlType::Int { bits: 32, unsigned: false };
/// 64-bit signed integer (`BIGINT`).
pub const INT64: SqlType = SqlType::Int { bits: 64, unsigned: false };
/// 8-bit unsigned integer.
pub const UINT8: SqlType = SqlType::Int { bits: 8, unsigned: true };
/// 16-bit unsigned integer.
pub const UINT16: SqlType = SqlType::Int { bits: 16, unsigned: true };
/// 24-bit unsigned integer.
pub const UINT24: SqlType = SqlType::Int { bits: 24, unsigned: true };
/// 32-bit unsigned integer.
pub const UINT32: SqlType = SqlType::Int { bits: 32, unsigned: true };
/// 64-bit unsigned integer.
pub const UINT64: SqlType = SqlType::Int { bits: 64, unsigned: true };
/// Alias for [`INT32`].
pub const INT: SqlType = INT32;
/// Alias for [`INT64`].
pub const BIGINT: SqlType = INT64;
/// Single-precision float.
pub const FLOAT: SqlType = SqlType::Float;
/// Double-precision float, `DOUBLE(12,6)` by default.
pub const DOUBLE: SqlType = SqlType::Double { size: 12, dec: 6 };
/// Exact decimal, `DECIMAL(12,6)` by default.
pub const DECIMAL: SqlType = SqlType::Decimal { size: 12, dec: 6 };
/// Variable-length string, `VARCHAR(255)` by default.
pub const STRING: SqlType = SqlType::Varchar { size: 255 };
/// Alias for [`STRING`].
pub const VARCHAR: SqlType = STRING;
/// Fixed-length string, `CHAR(255)` by default.
pub const CHAR: SqlType = SqlType::Char { size: 255 };
/// Single bit field.
pub const BIT: SqlType = SqlType::Bit { size: 1 };
/// Boolean.
pub const BOOL: SqlType = SqlType::Bool;

impl SqlType {
    /// Returns the DDL fragment for this type, excluding type-level tags.
    #[must_use]
    pub fn ddl_name(&self) -> String {
        match self {
            Self::Int { bits: 8, .. } => String::from("TINYINT"),
            Self::Int { bits: 16, .. } => String::from("SMALLINT"),
            Self::Int { bits: 24, .. } => String::from("MEDIUMINT"),
            Self::Int { bits: 32, .. } => String::from("INT"),
            Self::Int { .. } => String::from("BIGINT"),
            Self::Float => String::from("FLOAT"),
            Self::Double { size, dec } => format!("DOUBLE({size},{dec})"),
            Self::Decimal { size, dec } => format!("DECIMAL({size},{dec})"),
            Self::Char { size } => format!("CHAR({size})"),
            Self::Varchar { size } => format!("VARCHAR({size})"),
            Self::Bit { size } => format!("BIT({size})"),
            Self::Bool => String::from("BOOL"),
        }
    }

    /// Type-level tags emitted after the type name in a column definition.
    #[must_use]
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Self::Int { unsigned: true, .. } => &["UNSIGNED"],
            _ => &[],
        }
    }

    /// Full display name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        let mut name = self.ddl_name();
        for tag in self.tags() {
            name.push(' ');
            name.push_str(tag);
        }
        name
    }

    /// Whether the type accepts new parameters through the sizing
    /// constructors.
    #[must_use]
    pub const fn modifiable(&self) -> bool {
        matches!(
            self,
            Self::Double { .. }
                | Self::Decimal { .. }
                | Self::Char { .. }
                | Self::Varchar { .. }
                | Self::Bit { .. }
        )
    }

    /// Returns a variant of this type with a new size parameter.
    ///
    /// # Errors
    ///
    /// [`TypeError::NotParametrizable`] if the type carries no size;
    /// [`TypeError::OutOfRange`] for a bit width outside `1..=64`.
    pub fn with_size(&self, size: u32) -> Result<Self> {
        match self {
            Self::Char { .. } => Ok(Self::Char { size }),
            Self::Varchar { .. } => Ok(Self::Varchar { size }),
            Self::Bit { .. } if (1..=64).contains(&size) => Ok(Self::Bit { size }),
            Self::Bit { .. } => Err(TypeError::OutOfRange {
                ty: String::from("BIT"),
                value: size.to_string(),
            }),
            _ => Err(TypeError::NotParametrizable(self.name())),
        }
    }

    /// Returns a variant of this type with new precision parameters.
    ///
    /// # Errors
    ///
    /// [`TypeError::NotParametrizable`] if the type carries no precision.
    pub fn with_precision(&self, size: u32, dec: u32) -> Result<Self> {
        match self {
            Self::Double { .. } => Ok(Self::Double { size, dec }),
            Self::Decimal { .. } => Ok(Self::Decimal { size, dec }),
            _ => Err(TypeError::NotParametrizable(self.name())),
        }
    }

    /// The canonical default value of this type.
    #[must_use]
    pub const fn default_value(&self) -> SqlValue {
        match self {
            Self::Int { unsigned: true, .. } | Self::Bit { .. } => SqlValue::UInt(0),
            Self::Int { .. } => SqlValue::Int(0),
            Self::Float | Self::Double { .. } | Self::Decimal { .. } => SqlValue::Float(0.0),
            Self::Char { .. } | Self::Varchar { .. } => SqlValue::Text(String::new()),
            Self::Bool => SqlValue::Bool(false),
        }
    }

    /// Validates and narrows a raw value into the canonical in-memory form
    /// of this type.
    ///
    /// `Null` passes through untouched regardless of type.
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] when an integer exceeds the declared
    /// width, [`TypeError::InvalidValue`] when the value cannot be
    /// interpreted at all.
    pub fn cast(&self, value: &SqlValue) -> Result<SqlValue> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }

        match self {
            Self::Int { bits, unsigned } => {
                self.cast_integer(value, u32::from(*bits), *unsigned)
            }
            Self::Bit { size } => self.cast_integer(value, *size, true),
            Self::Float | Self::Double { .. } | Self::Decimal { .. } => {
                Ok(SqlValue::Float(self.to_float(value)?))
            }
            Self::Char { .. } | Self::Varchar { .. } => Ok(SqlValue::Text(self.to_text(value)?)),
            Self::Bool => Ok(SqlValue::Bool(truthy(value))),
        }
    }

    /// Renders a value as inline literal text through `cast`.
    ///
    /// `parse(Null)` is always the literal `NULL`.
    ///
    /// # Errors
    ///
    /// Propagates the cast failure for invalid values.
    pub fn parse(&self, value: &SqlValue) -> Result<String> {
        Ok(self.cast(value)?.to_sql_inline())
    }

    fn cast_integer(&self, value: &SqlValue, bits: u32, unsigned: bool) -> Result<SqlValue> {
        let n = self.to_i128(value)?;
        let (min, max) = if unsigned {
            (0, (1_i128 << bits) - 1)
        } else {
            (-(1_i128 << (bits - 1)), (1_i128 << (bits - 1)) - 1)
        };
        if n < min || n > max {
            return Err(TypeError::OutOfRange {
                ty: self.name(),
                value: n.to_string(),
            });
        }
        if unsigned {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            Ok(SqlValue::UInt(n as u64))
        } else {
            #[allow(clippy::cast_possible_truncation)]
            Ok(SqlValue::Int(n as i64))
        }
    }

    fn to_i128(&self, value: &SqlValue) -> Result<i128> {
        let invalid = || TypeError::InvalidValue {
            ty: self.name(),
            value: value.to_sql_inline(),
        };
        match value {
            SqlValue::Int(n) => Ok(i128::from(*n)),
            SqlValue::UInt(n) => Ok(i128::from(*n)),
            SqlValue::Bool(b) => Ok(i128::from(*b)),
            SqlValue::Float(f) if f.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                Ok(f.trunc() as i128)
            }
            SqlValue::Text(s) => s.trim().parse::<i128>().map_err(|_| invalid()),
            SqlValue::Bytes(b) if b.len() <= 8 => {
                Ok(b.iter().fold(0_i128, |acc, byte| (acc << 8) | i128::from(*byte)))
            }
            _ => Err(invalid()),
        }
    }

    fn to_float(&self, value: &SqlValue) -> Result<f64> {
        match value {
            SqlValue::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => Ok(*n as f64),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::UInt(n) => Ok(*n as f64),
            SqlValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            SqlValue::Text(s) => s.trim().parse::<f64>().map_err(|_| TypeError::InvalidValue {
                ty: self.name(),
                value: value.to_sql_inline(),
            }),
            _ => Err(TypeError::InvalidValue {
                ty: self.name(),
                value: value.to_sql_inline(),
            }),
        }
    }

    fn to_text(&self, value: &SqlValue) -> Result<String> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Int(n) => Ok(n.to_string()),
            SqlValue::UInt(n) => Ok(n.to_string()),
            SqlValue::Float(f) => Ok(f.to_string()),
            SqlValue::Bool(b) => Ok(b.to_string()),
            SqlValue::Bytes(b) => String::from_utf8(b.clone()).map_err(|_| {
                TypeError::InvalidValue {
                    ty: self.name(),
                    value: value.to_sql_inline(),
                }
            }),
            SqlValue::Null => Ok(String::new()),
        }
    }
}

fn truthy(value: &SqlValue) -> bool {
    match value {
        SqlValue::Null => false,
        SqlValue::Bool(b) => *b,
        SqlValue::Int(n) => *n != 0,
        SqlValue::UInt(n) => *n != 0,
        SqlValue::Float(f) => *f != 0.0,
        SqlValue::Text(s) => !s.is_empty(),
        SqlValue::Bytes(b) => b.iter().any(|byte| *byte != 0),
    }
}

/// Reverse lookup from a database-reported type string.
///
/// Accepts the names `DESCRIBE` produces, such as `varchar(255)`,
/// `bigint unsigned`, `int(11)` or `decimal(12,6)`. `tinyint(1)` maps to
/// [`BOOL`], which is how MySQL reports boolean columns.
///
/// # Errors
///
/// [`TypeError::Unrecognized`] when no registered type matches.
pub fn string_to_type(described: &str) -> Result<SqlType> {
    let lowered = described.trim().to_ascii_lowercase();
    let (body, unsigned) = match lowered.strip_suffix(" unsigned") {
        Some(body) => (body, true),
        None => (lowered.as_str(), false),
    };

    let (base, params) = match body.split_once('(') {
        Some((base, rest)) => {
            let inner = rest.strip_suffix(')').unwrap_or(rest);
            let params: Vec<u32> = inner
                .split(',')
                .filter_map(|p| p.trim().parse().ok())
                .collect();
            (base.trim(), params)
        }
        None => (body, Vec::new()),
    };

    let ty = match base {
        "tinyint" if params == [1] && !unsigned => SqlType::Bool,
        "tinyint" => SqlType::Int { bits: 8, unsigned },
        "smallint" => SqlType::Int { bits: 16, unsigned },
        "mediumint" => SqlType::Int { bits: 24, unsigned },
        "int" | "integer" => SqlType::Int { bits: 32, unsigned },
        "bigint" => SqlType::Int { bits: 64, unsigned },
        "bit" => {
            let size = params.first().copied().unwrap_or(1);
            // MySQL caps BIT at 64.
            if !(1..=64).contains(&size) {
                return Err(TypeError::Unrecognized(String::from(described)));
            }
            SqlType::Bit { size }
        }
        "char" => SqlType::Char {
            size: params.first().copied().unwrap_or(255),
        },
        "varchar" => SqlType::Varchar {
            size: params.first().copied().unwrap_or(255),
        },
        "float" => SqlType::Float,
        "double" => SqlType::Double {
            size: params.first().copied().unwrap_or(12),
            dec: params.get(1).copied().unwrap_or(6),
        },
        "decimal" | "numeric" | "dec" => SqlType::Decimal {
            size: params.first().copied().unwrap_or(12),
            dec: params.get(1).copied().unwrap_or(6),
        },
        "bool" | "boolean" => SqlType::Bool,
        _ => return Err(TypeError::Unrecognized(String::from(described))),
    };
    Ok(ty)
}
