//! Object Record values
//!
//! Drawing objects arrive from the CAD host in two shapes: dictionary-like
//! payloads and structured objects exposing named fields. Both are modelled
//! by [`AttrValue`]; which lookup a value supports is reported by
//! [`AttrValue::access`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A loosely-typed property value read from a drawing object
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
    /// Mapping from string keys to values (supports key lookup)
    Map(BTreeMap<String, AttrValue>),
    /// Structured object (supports named-field read)
    Object(CadObject),
}

/// Lookup capability of a value
#[derive(Debug, Clone, Copy)]
pub enum Access<'a> {
    /// Key-based lookup into a mapping
    Keyed(&'a BTreeMap<String, AttrValue>),
    /// Named-field read on a structured object
    Fields(&'a CadObject),
    /// Neither lookup is supported
    Opaque,
}

impl AttrValue {
    /// Build a mapping value from key/value pairs
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Report which lookup this value supports
    pub fn access(&self) -> Access<'_> {
        match self {
            Self::Map(map) => Access::Keyed(map),
            Self::Object(object) => Access::Fields(object),
            _ => Access::Opaque,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Bit pattern used for float equality and hashing.
/// Zero signs and NaN payloads are collapsed.
fn float_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => float_key(*a) == float_key(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl Hash for AttrValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(value) => value.hash(state),
            Self::Integer(value) => value.hash(state),
            Self::Float(value) => float_key(*value).hash(state),
            Self::Text(value) => value.hash(state),
            Self::List(values) => values.hash(state),
            Self::Map(map) => map.hash(state),
            Self::Object(object) => object.hash(state),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            // always keeps a fractional part, so 1.0 never reads as the integer 1
            Self::Float(value) => write!(f, "{:?}", value),
            Self::Text(value) => f.write_str(value),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Self::Map(map) => write_fields(f, map),
            Self::Object(object) => {
                write!(f, "{} ", object.type_name)?;
                write_fields(f, &object.fields)
            }
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &BTreeMap<String, AttrValue>) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", key, value)?;
    }
    f.write_str("}")
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<CadObject> for AttrValue {
    fn from(value: CadObject) -> Self {
        Self::Object(value)
    }
}

impl From<BTreeMap<String, AttrValue>> for AttrValue {
    fn from(value: BTreeMap<String, AttrValue>) -> Self {
        Self::Map(value)
    }
}

/// Structured drawing object exposing named fields
///
/// Mirrors host objects such as a Rhino object whose `Attributes` and
/// `Geometry` members are themselves objects with their own fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CadObject {
    type_name: String,
    fields: BTreeMap<String, AttrValue>,
}

impl CadObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Read a named field
    pub fn field(&self, name: &str) -> Option<&AttrValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for CadObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
