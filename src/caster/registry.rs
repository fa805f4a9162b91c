// Caster registry
//
// Declarative schema documents and settings overrides name their casters.
// The registry maps those names to casters and parses caster descriptions.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::caster::Caster;
use crate::internal::error::{Error, Result};
use crate::value::Enumeration;

/// Name to caster lookup table
#[derive(Debug, Clone, Default)]
pub struct CasterRegistry {
    casters: HashMap<String, Caster>,
}

impl CasterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            casters: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in casters:
    /// `int`, `float`, `bool`, `str`, `bytes`, `list`, `none`, `noop` and `auto`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("int", Caster::int());
        registry.register("float", Caster::float());
        registry.register("bool", Caster::boolean());
        registry.register("str", Caster::string());
        registry.register("bytes", Caster::bytes());
        registry.register("list", Caster::list());
        registry.register("none", Caster::none());
        registry.register("noop", Caster::NoOp);
        registry.register("auto", Caster::heuristic());
        registry
    }

    /// Registers a caster, replacing any caster with the same name.
    pub fn register(&mut self, name: &str, caster: Caster) {
        self.casters.insert(name.to_string(), caster);
    }

    /// Registers an enumeration caster under the enumeration's name.
    pub fn register_enumeration(&mut self, enumeration: Arc<Enumeration>) {
        let name = enumeration.name().to_string();
        self.register(&name, Caster::enumeration(enumeration));
    }

    pub fn get(&self, name: &str) -> Option<&Caster> {
        self.casters.get(name)
    }

    /// Looks a caster up by name.
    pub fn resolve(&self, name: &str) -> Result<Caster> {
        self.casters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidCaster(format!("unknown caster name '{}'", name)))
    }

    /// Parses a caster description.
    ///
    /// A string names a caster, an array is a chain and `null` is the no-op
    /// caster. Objects, numbers and booleans are not casters.
    pub fn parse(&self, json: &Json) -> Result<Caster> {
        match json {
            Json::Null => Ok(Caster::NoOp),
            Json::String(name) => self.resolve(name),
            Json::Array(items) => {
                let stages = items
                    .iter()
                    .map(|item| self.parse(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Caster::Chain(stages))
            }
            other => Err(Error::InvalidCaster(other.to_string())),
        }
    }
}
