// Built-in casters
//
// Constructors for the casters most schemas need. Type casters are type
// guarded: a value that already has the target kind is returned unchanged.

use std::sync::Arc;

use bytes::Bytes;

use crate::caster::{heuristic, Caster};
use crate::internal::error::CasterError;
use crate::value::{Enumeration, Kind, Value};

/// Whether truncating `x` yields a value representable as `i64`.
fn in_int_range(x: f64) -> bool {
    let t = x.trunc();
    t >= i64::MIN as f64 && t < i64::MAX as f64
}

impl Caster {
    /// Integer caster. Booleans become 0/1, floats are truncated, strings are
    /// parsed after trimming surrounding whitespace.
    pub fn int() -> Caster {
        Caster::typed(Kind::Int, "int", |value| match value {
            Value::Bool(b) => Ok(Value::Int(b as i64)),
            Value::Float(x) if in_int_range(x) => Ok(Value::Int(x.trunc() as i64)),
            Value::String(s) => Ok(Value::Int(s.trim().parse::<i64>()?)),
            other => Err(CasterError::unsupported(&other, "int")),
        })
    }

    /// Float caster.
    pub fn float() -> Caster {
        Caster::typed(Kind::Float, "float", |value| match value {
            Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
            Value::Int(i) => Ok(Value::Float(i as f64)),
            Value::String(s) => Ok(Value::Float(s.trim().parse::<f64>()?)),
            other => Err(CasterError::unsupported(&other, "float")),
        })
    }

    /// Boolean caster based on truthiness. Note that any non-empty string,
    /// including `"false"`, is true; use [`Caster::heuristic`] first to read
    /// boolean-like words.
    pub fn boolean() -> Caster {
        Caster::typed(Kind::Bool, "bool", |value| Ok(Value::Bool(value.is_truthy())))
    }

    /// String caster, using the textual rendering of the value.
    pub fn string() -> Caster {
        Caster::typed(Kind::String, "str", |value| Ok(Value::String(value.to_string())))
    }

    /// Binary caster. Strings are taken as UTF-8, lists must hold byte-sized
    /// integers.
    pub fn bytes() -> Caster {
        Caster::typed(Kind::Bytes, "bytes", |value| match value {
            Value::String(s) => Ok(Value::Bytes(Bytes::from(s.into_bytes()))),
            Value::List(items) => {
                let mut buf = Vec::with_capacity(items.len());
                for item in &items {
                    match item {
                        Value::Int(i) if (0..=255).contains(i) => buf.push(*i as u8),
                        other => return Err(CasterError::unsupported(other, "byte")),
                    }
                }
                Ok(Value::Bytes(Bytes::from(buf)))
            }
            other => Err(CasterError::unsupported(&other, "bytes")),
        })
    }

    /// List caster. Strings split into characters, bytes into integers and
    /// maps into their keys.
    pub fn list() -> Caster {
        Caster::typed(Kind::List, "list", |value| match value {
            Value::String(s) => Ok(Value::List(
                s.chars().map(|c| Value::String(c.to_string())).collect(),
            )),
            Value::Bytes(b) => Ok(Value::List(b.iter().map(|x| Value::Int(*x as i64)).collect())),
            Value::Map(record) => Ok(Value::List(
                record.keys().map(Value::from).collect(),
            )),
            other => Err(CasterError::unsupported(&other, "list")),
        })
    }

    /// The none-type caster: accepts any value unchanged.
    pub fn none() -> Caster {
        Caster::NoOp
    }

    /// Enumeration caster. Members of the enumeration pass through, other
    /// values are looked up by member value.
    pub fn enumeration(enumeration: Arc<Enumeration>) -> Caster {
        let kind = Kind::Member {
            id: enumeration.id(),
            name: enumeration.name().to_string(),
        };
        let name = enumeration.name().to_string();
        Caster::typed(kind, &name, move |value| {
            enumeration
                .lookup(&value)
                .map(Value::Member)
                .ok_or_else(|| CasterError::UnknownMember {
                    enumeration: enumeration.name().to_string(),
                    value: value.to_string(),
                })
        })
    }

    /// Validator caster: passes the value through when `predicate` holds.
    pub fn check(name: &str, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Caster {
        let check = name.to_string();
        Caster::new(name, move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(CasterError::Rejected {
                    check: check.clone(),
                    value: value.to_string(),
                })
            }
        })
    }

    /// Reinterprets strings as numbers, none or booleans when they look like
    /// one. See [`heuristic::interpret`].
    pub fn heuristic() -> Caster {
        Caster::new("auto", |value| match value {
            Value::String(s) => Ok(heuristic::interpret(&s)),
            other => Ok(other),
        })
    }
}
