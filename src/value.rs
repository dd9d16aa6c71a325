use std::{collections::HashMap, fmt};

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ast::{QueryDescriptor, ScalarType, TypeRef, builder::CLOSURE_TYPE};

/// A value that can sit in a `Constant` node or be bound as a parameter.
///
/// Scalars cover the basic types a query may compare against; `Object` plays
/// the role of a captured instance (a closure or any record whose members are
/// read by name); `Query` is the descriptor at the root of an operator chain.
///
/// # Examples
///
/// ```
/// use elastic_query::Value;
/// use std::collections::HashMap;
///
/// let age = Value::from(30);
/// let name = Value::from("Alice");
///
/// let mut closure = HashMap::new();
/// closure.insert("minAge".to_string(), Value::Integer(18));
/// let captured = Value::Object(closure);
///
/// assert_eq!(captured.member("minAge"), Some(&Value::Integer(18)));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    Boolean(bool),

    Integer(i64),

    Float(f64),

    /// Exact decimal (money and the like)
    Decimal(Decimal),

    String(String),

    /// Date/time with offset
    DateTime(DateTime<FixedOffset>),

    Guid(Uuid),

    Array(Vec<Value>),

    /// Instance with named members
    Object(HashMap<String, Value>),

    /// Root descriptor of a query
    Query(Box<QueryDescriptor>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Read a member off an object instance.
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.get(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Guid(_) => "guid",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Query(_) => "query",
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        match self {
            Value::Null => TypeRef::opaque("object"),
            Value::Boolean(_) => TypeRef::Scalar(ScalarType::Bool),
            Value::Integer(_) => TypeRef::Scalar(ScalarType::Int),
            Value::Float(_) => TypeRef::Scalar(ScalarType::Float),
            Value::Decimal(_) => TypeRef::Scalar(ScalarType::Decimal),
            Value::String(_) => TypeRef::Scalar(ScalarType::String),
            Value::DateTime(_) => TypeRef::Scalar(ScalarType::DateTimeOffset),
            Value::Guid(_) => TypeRef::Scalar(ScalarType::Guid),
            Value::Array(_) => TypeRef::list(TypeRef::opaque("object")),
            Value::Object(_) => TypeRef::opaque(CLOSURE_TYPE),
            Value::Query(q) => TypeRef::opaque(format!("Query<{}>", q.element_type)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Value::Guid(g) => write!(f, "{}", g),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(_) => f.write_str(CLOSURE_TYPE),
            Value::Query(q) => write!(f, "{}", q.dataset_name),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}
