//! Typed SQL constants.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::schema::DataType;

/// A typed SQL constant.
///
/// `PartialEq` on `Constant` is structural (`Null == Null`); SQL equality,
/// which yields `NULL` when either side is `NULL`, is [`Constant::equals`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    /// SQL NULL.
    #[default]
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 text.
    Text(String),
}

impl Constant {
    /// Returns the data type of this constant, `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Constant::Null => None,
            Constant::Boolean(_) => Some(DataType::Boolean),
            Constant::Integer(_) => Some(DataType::Integer),
            Constant::Text(_) => Some(DataType::Text),
        }
    }

    /// Returns true if this constant is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Constant::Null)
    }

    /// Returns the value as a bool, if it is `Boolean`.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Constant::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Constant::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Constant::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Checks if this constant can be stored in a column of the given type.
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        self.data_type().is_none_or(|t| t == data_type)
    }

    /// Orders two non-NULL constants of the same type.
    ///
    /// Integers compare numerically, text bytewise (binary collation) and
    /// `false < true`. Returns `None` for NULL or mixed types.
    pub fn compare(&self, other: &Constant) -> Option<Ordering> {
        match (self, other) {
            (Constant::Boolean(a), Constant::Boolean(b)) => Some(a.cmp(b)),
            (Constant::Integer(a), Constant::Integer(b)) => Some(a.cmp(b)),
            (Constant::Text(a), Constant::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            _ => None,
        }
    }

    /// Applies a comparison under three-valued logic.
    ///
    /// Yields `Null` if either side is NULL, a boolean from `accept` applied
    /// to the ordering otherwise, and `None` when the sides are incomparable.
    pub fn compare_with(
        &self,
        other: &Constant,
        accept: impl FnOnce(Ordering) -> bool,
    ) -> Option<Constant> {
        if self.is_null() || other.is_null() {
            return Some(Constant::Null);
        }
        self.compare(other)
            .map(|ordering| Constant::Boolean(accept(ordering)))
    }

    /// SQL `=`: `Null` if either side is NULL.
    pub fn equals(&self, other: &Constant) -> Option<Constant> {
        self.compare_with(other, Ordering::is_eq)
    }

    /// Three-valued `AND`.
    pub fn and(&self, other: &Constant) -> Option<Constant> {
        Some(match (self.truth()?, other.truth()?) {
            (Some(false), _) | (_, Some(false)) => Constant::Boolean(false),
            (Some(true), Some(true)) => Constant::Boolean(true),
            _ => Constant::Null,
        })
    }

    /// Three-valued `OR`.
    pub fn or(&self, other: &Constant) -> Option<Constant> {
        Some(match (self.truth()?, other.truth()?) {
            (Some(true), _) | (_, Some(true)) => Constant::Boolean(true),
            (Some(false), Some(false)) => Constant::Boolean(false),
            _ => Constant::Null,
        })
    }

    /// Three-valued `NOT`: `NOT NULL` is NULL.
    pub fn not(&self) -> Option<Constant> {
        Some(match self.truth()? {
            Some(b) => Constant::Boolean(!b),
            None => Constant::Null,
        })
    }

    /// Casts this constant to `target`.
    ///
    /// NULL casts to NULL. Returns `None` where the engine raises a
    /// conversion error (for example `'abc'` to an integer).
    pub fn cast(&self, target: DataType) -> Option<Constant> {
        match (self, target) {
            (Constant::Null, _) => Some(Constant::Null),

            (Constant::Boolean(b), DataType::Boolean) => Some(Constant::Boolean(*b)),
            (Constant::Boolean(b), DataType::Integer) => Some(Constant::Integer(i64::from(*b))),
            (Constant::Boolean(b), DataType::Text) => Some(Constant::Text(b.to_string())),

            (Constant::Integer(v), DataType::Boolean) => Some(Constant::Boolean(*v != 0)),
            (Constant::Integer(v), DataType::Integer) => Some(Constant::Integer(*v)),
            (Constant::Integer(v), DataType::Text) => Some(Constant::Text(v.to_string())),

            (Constant::Text(s), DataType::Boolean) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "yes" | "y" | "1" => Some(Constant::Boolean(true)),
                    "false" | "f" | "no" | "n" | "0" => Some(Constant::Boolean(false)),
                    _ => None,
                }
            }
            (Constant::Text(s), DataType::Integer) => s.trim().parse().ok().map(Constant::Integer),
            (Constant::Text(s), DataType::Text) => Some(Constant::Text(s.clone())),
        }
    }

    /// Renders this constant as a SQL literal.
    pub fn text_representation(&self) -> String {
        match self {
            Constant::Null => "NULL".to_string(),
            Constant::Boolean(true) => "TRUE".to_string(),
            Constant::Boolean(false) => "FALSE".to_string(),
            Constant::Integer(v) if *v < 0 => format!("({v})"),
            Constant::Integer(v) => v.to_string(),
            Constant::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    /// `Some(Some(b))` for booleans, `Some(None)` for NULL, `None` otherwise.
    fn truth(&self) -> Option<Option<bool>> {
        match self {
            Constant::Null => Some(None),
            Constant::Boolean(b) => Some(Some(*b)),
            _ => None,
        }
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null => write!(f, "NULL"),
            Constant::Boolean(b) => write!(f, "{b}"),
            Constant::Integer(v) => write!(f, "{v}"),
            Constant::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Self {
        Constant::Boolean(b)
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::Integer(v)
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Constant::Text(s.to_string())
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Self {
        Constant::Text(s)
    }
}

impl<T: Into<Constant>> From<Option<T>> for Constant {
    fn from(value: Option<T>) -> Self {
        value.map_or(Constant::Null, Into::into)
    }
}
