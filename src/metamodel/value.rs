//! Attribute values and the conversions between Rust field types and [`Value`].

use crate::error::{FluentQueryError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// A bound parameter or column value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
}

/// Declared value kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    Decimal,
    Text,
    Timestamp,
    Uuid,
    /// Reference to another domain record, named by its entity name
    Association(&'static str),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind of a non-null value
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueKind::Boolean),
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Decimal(_) => Some(ValueKind::Decimal),
            Value::Text(_) => Some(ValueKind::Text),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Uuid(_) => Some(ValueKind::Uuid),
        }
    }

    /// SQL comparison semantics: null compares to nothing, numbers compare across
    /// integer, float and decimal representations.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (a, b) => match (a.as_decimal(), b.as_decimal()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            },
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            Value::Float(f) => Decimal::from_f64(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Timestamp(t) => write!(f, "'{t}'"),
            Value::Uuid(u) => write!(f, "'{u}'"),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Association(target) => write!(f, "reference to {target}"),
            other => write!(f, "{}", format!("{other:?}").to_lowercase()),
        }
    }
}

/// Rust types usable as attribute value types
pub trait FieldValue: Sized + Send + Sync + 'static {
    /// Kind an attribute of this type must be declared with
    fn kind() -> ValueKind;

    fn into_value(self) -> Value;

    /// Convert back from a non-null value, `None` when the representation is incompatible
    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldValue for bool {
    fn kind() -> ValueKind {
        ValueKind::Boolean
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }
}

impl FieldValue for i64 {
    fn kind() -> ValueKind {
        ValueKind::Integer
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }
}

impl FieldValue for i32 {
    fn kind() -> ValueKind {
        ValueKind::Integer
    }

    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FieldValue for f64 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }
}

impl FieldValue for Decimal {
    fn kind() -> ValueKind {
        ValueKind::Decimal
    }

    fn into_value(self) -> Value {
        Value::Decimal(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_decimal()
    }
}

impl FieldValue for String {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self.naive_utc())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(t.and_utc()),
            _ => None,
        }
    }
}

impl FieldValue for Uuid {
    fn kind() -> ValueKind {
        ValueKind::Uuid
    }

    fn into_value(self) -> Value {
        Value::Uuid(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uuid(u) => Some(*u),
            Value::Text(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i64 => Integer,
    i32 => Integer,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    &str => Text,
    NaiveDateTime => Timestamp,
    Uuid => Uuid,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Attribute-name keyed values of one record, produced by row mapping and
/// consumed by [`Entity::from_values`](crate::metamodel::Entity::from_values).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordValues {
    entity: &'static str,
    values: HashMap<&'static str, Value>,
}

impl RecordValues {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, attribute: &'static str, value: Value) {
        self.values.insert(attribute, value);
    }

    pub fn raw(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Typed read; absent and null both read as `None`
    pub fn get<V: FieldValue>(&self, attribute: &str) -> Result<Option<V>> {
        match self.values.get(attribute) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => V::from_value(value).map(Some).ok_or_else(|| {
                FluentQueryError::row_mapping(
                    self.entity,
                    attribute,
                    format!("cannot read {value:?} as {}", V::kind()),
                )
            }),
        }
    }

    /// Typed read of a value that must be present
    pub fn require<V: FieldValue>(&self, attribute: &str) -> Result<V> {
        self.get(attribute)?.ok_or_else(|| {
            FluentQueryError::row_mapping(self.entity, attribute, "required value is missing")
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
