//! Open document metadata: string keys to scalars or lists of scalars.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Document metadata. Ordered so serialized corpora are stable.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata scalar.
///
/// Untagged: JSON `null`, booleans, integers, floats and strings map
/// directly. Integers that overflow `i64` fall through to `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Equality used by search filters. Numbers compare by value across
    /// the `Int`/`Float` split; everything else compares structurally.
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            _ => self == other,
        }
    }

    /// Truthiness: `null`, `false`, zero and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A metadata field value: one scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl MetadataValue {
    /// Build a list value from anything convertible to scalars.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Filter semantics: equal to a scalar field, or contained in a list field.
    pub fn matches(&self, wanted: &Scalar) -> bool {
        match self {
            Self::Scalar(s) => s.matches(wanted),
            Self::List(items) => items.iter().any(|item| item.matches(wanted)),
        }
    }

    /// Whether a list field contains the given text.
    pub fn contains_text(&self, text: &str) -> bool {
        match self {
            Self::Scalar(s) => s.as_str() == Some(text),
            Self::List(items) => items.iter().any(|item| item.as_str() == Some(text)),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_truthy(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

macro_rules! scalar_metadata_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MetadataValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_metadata_from!(&str, String, i64, f64, bool);

impl From<Scalar> for MetadataValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}
