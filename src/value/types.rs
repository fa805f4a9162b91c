// Dynamic value model for datacast
//
// Input records are loosely typed, so every value flowing through the
// casting engine is represented by a single enum. Casters inspect the
// variant (or its `Kind`) and produce a new `Value`.

use std::fmt;

use bytes::Bytes;

use crate::value::callable::Callable;
use crate::value::enumeration::Member;
use crate::value::record::Record;

/// A single value read from an input record or produced by a caster.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Bytes),
    List(Vec<Value>),
    Map(Record),
    /// A member of a user declared [`Enumeration`](crate::value::Enumeration)
    Member(Member),
    /// A zero-argument producer stored as a plain value
    Callable(Callable),
}

impl Value {
    /// Returns the exact-type tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Member(member) => Kind::Member {
                id: member.enumeration_id(),
                name: member.enumeration().to_string(),
            },
            Value::Callable(_) => Kind::Callable,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Truthiness: empty containers, zero and `Null` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(record) => !record.is_empty(),
            Value::Member(_) | Value::Callable(_) => true,
        }
    }
}

/// Exact-type tag of a [`Value`].
///
/// Type-guarded casters compare tags to skip redundant conversions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    List,
    Map,
    /// Members are tagged with their enumeration's identity, so two
    /// enumerations never share a kind, even under the same name.
    Member { id: u64, name: String },
    Callable,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Null => write!(f, "none"),
            Kind::Bool => write!(f, "bool"),
            Kind::Int => write!(f, "int"),
            Kind::Float => write!(f, "float"),
            Kind::String => write!(f, "str"),
            Kind::Bytes => write!(f, "bytes"),
            Kind::List => write!(f, "list"),
            Kind::Map => write!(f, "map"),
            Kind::Member { name, .. } => write!(f, "{}", name),
            Kind::Callable => write!(f, "callable"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            // Debug formatting keeps the fractional part ("1.0")
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", hex::encode(b)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(record) => {
                write!(f, "{{")?;
                for (i, (key, value)) in record.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Member(member) => write!(f, "{}", member.value()),
            Value::Callable(callable) => write!(f, "<callable {}>", callable.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
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

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Map(record)
    }
}

impl From<Member> for Value {
    fn from(member: Member) -> Self {
        Value::Member(member)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Callable(callable)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_textual_rendering() {
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Bytes(Bytes::from_static(b"\x01\xff")).to_string(), "01ff");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, a]"
        );
    }

    #[test]
    fn test_kind_distinguishes_int_and_bool() {
        assert_eq!(Value::Int(1).kind(), Kind::Int);
        assert_eq!(Value::Bool(true).kind(), Kind::Bool);
        assert_ne!(Value::Int(1).kind(), Value::Bool(true).kind());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(3).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("False").is_truthy());
        assert!(!Value::List(Vec::new()).is_truthy());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
