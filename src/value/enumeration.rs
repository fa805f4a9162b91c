// Named value sets
//
// An enumeration maps member names to underlying values. Members are values
// of their own kind, so an enumeration caster can short-circuit when it is
// handed one of its members.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::value::types::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A user declared enumeration, e.g. `SimpleEnum { ONE = 1, TWO = 2 }`.
///
/// Each `Enumeration::new` creates a distinct enumeration; clones share its
/// identity, while another enumeration with the same name does not.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    id: u64,
    name: Arc<str>,
    members: Vec<(Arc<str>, Value)>,
}

impl Enumeration {
    pub fn new(name: &str) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
            members: Vec::new(),
        }
    }

    /// Adds a member. Later members with a duplicate name are ignored.
    pub fn member(mut self, name: &str, value: impl Into<Value>) -> Self {
        if !self.members.iter().any(|(n, _)| &**n == name) {
            self.members.push((Arc::from(name), value.into()));
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity shared by this enumeration, its clones and its members.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the member with the given name.
    pub fn get(&self, name: &str) -> Option<Member> {
        self.members
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(n, v)| self.make_member(n, v))
    }

    /// Looks a member up by its underlying value.
    pub fn lookup(&self, value: &Value) -> Option<Member> {
        self.members
            .iter()
            .find(|(_, v)| v == value)
            .map(|(n, v)| self.make_member(n, v))
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        self.members.iter().map(|(n, v)| self.make_member(n, v))
    }

    fn make_member(&self, name: &Arc<str>, value: &Value) -> Member {
        Member {
            enumeration_id: self.id,
            enumeration: self.name.clone(),
            name: name.clone(),
            value: Box::new(value.clone()),
        }
    }
}

/// One member of an [`Enumeration`].
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    enumeration_id: u64,
    enumeration: Arc<str>,
    name: Arc<str>,
    value: Box<Value>,
}

impl Member {
    pub fn enumeration(&self) -> &str {
        &self.enumeration
    }

    pub fn enumeration_id(&self) -> u64 {
        self.enumeration_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enumeration, self.name)
    }
}
