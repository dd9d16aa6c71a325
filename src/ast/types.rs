use std::{fmt, sync::Arc};

use crate::value::Value;

/// Name of the opaque type that declares the query operators
/// (`Where`, `Select`, `OrderBy`, ...).
pub const QUERYABLE: &str = "Queryable";

/// Scalar types. Every scalar counts as a "basic" type for projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    Char,
    Int,
    UInt,
    Float,
    Decimal,
    String,
    DateTime,
    DateTimeOffset,
    Guid,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Char => "char",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Decimal => "decimal",
            ScalarType::String => "string",
            ScalarType::DateTime => "datetime",
            ScalarType::DateTimeOffset => "datetimeoffset",
            ScalarType::Guid => "guid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "bool" | "boolean" => ScalarType::Bool,
            "char" => ScalarType::Char,
            "int" | "long" | "short" | "byte" => ScalarType::Int,
            "uint" | "ulong" | "ushort" => ScalarType::UInt,
            "float" | "double" => ScalarType::Float,
            "decimal" => ScalarType::Decimal,
            "string" => ScalarType::String,
            "datetime" | "date" => ScalarType::DateTime,
            "datetimeoffset" => ScalarType::DateTimeOffset,
            "guid" | "uuid" => ScalarType::Guid,
            _ => return None,
        };
        Some(scalar)
    }
}

/// A public instance property of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeRef,
}

/// Schema of a record: what reflection would report about a class.
///
/// Properties keep declaration order; the no-projection fallback emits one
/// column per property in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordType {
    pub name: String,
    pub properties: Vec<Property>,
    /// Static members, readable without an instance (`Type.Member`).
    pub statics: Vec<(String, Value)>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        RecordType {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.properties.push(Property {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn with_static(mut self, name: impl Into<String>, value: Value) -> Self {
        self.statics.push((name.into(), value));
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn static_member(&self, name: &str) -> Option<&Value> {
        self.statics
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| value)
    }

    pub fn into_type(self) -> TypeRef {
        TypeRef::Record(Arc::new(self))
    }
}

/// Reference to a type, carried by AST nodes in place of runtime reflection.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Scalar(ScalarType),
    /// Nullable wrapper around a value type (`int?`).
    Nullable(Box<TypeRef>),
    Record(Arc<RecordType>),
    List(Box<TypeRef>),
    /// A type known only by name (static helper classes, generic wrappers).
    Opaque(String),
}

impl TypeRef {
    pub fn scalar(scalar: ScalarType) -> Self {
        TypeRef::Scalar(scalar)
    }

    pub fn nullable(inner: TypeRef) -> Self {
        TypeRef::Nullable(Box::new(inner))
    }

    pub fn list(element: TypeRef) -> Self {
        TypeRef::List(Box::new(element))
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        TypeRef::Opaque(name.into())
    }

    pub fn string() -> Self {
        TypeRef::Scalar(ScalarType::String)
    }

    pub fn bool() -> Self {
        TypeRef::Scalar(ScalarType::Bool)
    }

    pub fn queryable() -> Self {
        TypeRef::Opaque(QUERYABLE.to_string())
    }

    /// The type's identity. Two references denote the same type when their
    /// names match.
    pub fn name(&self) -> String {
        match self {
            TypeRef::Scalar(s) => s.name().to_string(),
            TypeRef::Nullable(inner) => format!("{}?", inner.name()),
            TypeRef::Record(record) => record.name.clone(),
            TypeRef::List(element) => format!("list<{}>", element.name()),
            TypeRef::Opaque(name) => name.clone(),
        }
    }

    pub fn same_type(&self, other: &TypeRef) -> bool {
        match (self, other) {
            (TypeRef::Scalar(a), TypeRef::Scalar(b)) => a == b,
            (TypeRef::Record(a), TypeRef::Record(b)) => Arc::ptr_eq(a, b) || a.name == b.name,
            _ => self.name() == other.name(),
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TypeRef::Scalar(ScalarType::Bool))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeRef::Scalar(ScalarType::String))
    }

    pub fn is_queryable(&self) -> bool {
        matches!(self, TypeRef::Opaque(name) if name == QUERYABLE)
    }

    /// Basic-type test: primitive, string, decimal, date/time, date/time with
    /// offset or unique id. A nullable wrapper is looked through only when
    /// `include_nullable` is set.
    pub fn is_basic_type(&self, include_nullable: bool) -> bool {
        match self {
            TypeRef::Scalar(_) => true,
            TypeRef::Nullable(inner) if include_nullable => inner.is_basic_type(false),
            _ => false,
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            TypeRef::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Public instance property names, in declaration order. Non-record types
    /// have none.
    pub fn public_properties(&self) -> Vec<&str> {
        match self {
            TypeRef::Record(record) => {
                record.properties.iter().map(|p| p.name.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A property or field as seen from a member access or binding.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRef {
    pub name: String,
    /// Type the member is declared on.
    pub declaring_type: TypeRef,
    /// Type of the member's value.
    pub ty: TypeRef,
}

impl MemberRef {
    pub fn new(name: impl Into<String>, declaring_type: TypeRef, ty: TypeRef) -> Self {
        MemberRef {
            name: name.into(),
            declaring_type,
            ty,
        }
    }

    /// Look the member up on a record type; unknown members get an opaque
    /// value type.
    pub fn of(declaring_type: &TypeRef, name: &str) -> Self {
        let ty = declaring_type
            .as_record()
            .and_then(|r| r.property(name))
            .map(|p| p.ty.clone())
            .unwrap_or_else(|| TypeRef::opaque("object"));
        MemberRef::new(name, declaring_type.clone(), ty)
    }
}
