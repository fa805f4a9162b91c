// Partial settings overrides
//
// Overrides are an ordered list of option entries, built in code or parsed
// from a JSON object. They are applied on top of the default profile by
// `Settings::from_overrides`.

use std::sync::Arc;

use serde_json::Value as Json;

use crate::caster::{Caster, CasterRegistry};
use crate::internal::error::{Error, Result};
use crate::processor::ContainerFactory;
use crate::settings::{Policy, Settings};
use crate::value::{Value, ValueFactory};

/// The value of a single settings option.
#[derive(Debug, Clone)]
pub enum OptionValue {
    Policy(Policy),
    Text(String),
    Flag(bool),
    Value(Value),
    Factory(ValueFactory),
    Container(ContainerFactory),
    Casters(Vec<Caster>),
    Settings(Arc<Settings>),
}

impl OptionValue {
    /// Short rendering used in error messages.
    pub fn describe(&self) -> String {
        match self {
            OptionValue::Policy(policy) => policy.to_string(),
            OptionValue::Text(text) => text.clone(),
            OptionValue::Flag(flag) => flag.to_string(),
            OptionValue::Value(value) => value.to_string(),
            OptionValue::Factory(_) => "<factory>".to_string(),
            OptionValue::Container(factory) => factory.name().to_string(),
            OptionValue::Casters(casters) => Caster::Chain(casters.clone()).to_string(),
            OptionValue::Settings(_) => "<settings>".to_string(),
        }
    }
}

impl From<Policy> for OptionValue {
    fn from(policy: Policy) -> Self {
        OptionValue::Policy(policy)
    }
}

impl From<&str> for OptionValue {
    fn from(text: &str) -> Self {
        OptionValue::Text(text.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(text: String) -> Self {
        OptionValue::Text(text)
    }
}

impl From<bool> for OptionValue {
    fn from(flag: bool) -> Self {
        OptionValue::Flag(flag)
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        OptionValue::Value(value)
    }
}

impl From<ValueFactory> for OptionValue {
    fn from(factory: ValueFactory) -> Self {
        OptionValue::Factory(factory)
    }
}

impl From<ContainerFactory> for OptionValue {
    fn from(factory: ContainerFactory) -> Self {
        OptionValue::Container(factory)
    }
}

impl From<Vec<Caster>> for OptionValue {
    fn from(casters: Vec<Caster>) -> Self {
        OptionValue::Casters(casters)
    }
}

impl From<Arc<Settings>> for OptionValue {
    fn from(settings: Arc<Settings>) -> Self {
        OptionValue::Settings(settings)
    }
}

impl From<Settings> for OptionValue {
    fn from(settings: Settings) -> Self {
        OptionValue::Settings(Arc::new(settings))
    }
}

/// Ordered settings overrides.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: Vec<(String, OptionValue)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Overrides::insert`].
    pub fn set(mut self, option: &str, value: impl Into<OptionValue>) -> Self {
        self.insert(option, value);
        self
    }

    /// Sets an option, replacing any earlier value for it.
    pub fn insert(&mut self, option: &str, value: impl Into<OptionValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| name == option) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((option.to_string(), value)),
        }
    }

    pub fn get(&self, option: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, option: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(name, _)| name == option)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses overrides from a JSON object.
    ///
    /// Caster lists are resolved through `registry`. The only container
    /// name understood is `record`.
    pub fn from_json(json: &Json, registry: &CasterRegistry) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::invalid_option(json.to_string(), "settings"))?;

        let mut overrides = Overrides::new();
        for (option, value) in object {
            let value = match (option.as_str(), value) {
                ("on_extra" | "on_invalid" | "on_missing", Json::String(text)) => {
                    OptionValue::Text(text.clone())
                }
                ("store_callables", Json::Bool(flag)) => OptionValue::Flag(*flag),
                ("precasters" | "postcasters", Json::Array(items)) => OptionValue::Casters(
                    items
                        .iter()
                        .map(|item| registry.parse(item))
                        .collect::<Result<Vec<_>>>()?,
                ),
                ("precasters" | "postcasters", single) => {
                    OptionValue::Casters(vec![registry.parse(single)?])
                }
                ("result_container", Json::String(name)) if name == "record" => {
                    OptionValue::Container(ContainerFactory::record())
                }
                ("result_container", other) => {
                    return Err(Error::invalid_option(other.to_string(), "result_container"))
                }
                (_, other) => OptionValue::Value(Value::from(other.clone())),
            };
            overrides.insert(option, value);
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces() {
        let mut overrides = Overrides::new().set("on_extra", "store");
        overrides.insert("on_extra", Policy::Raise);
        assert_eq!(overrides.len(), 1);
        assert!(matches!(
            overrides.get("on_extra"),
            Some(OptionValue::Policy(Policy::Raise))
        ));
    }

    #[test]
    fn test_from_json() {
        let registry = CasterRegistry::with_builtins();
        let overrides = Overrides::from_json(
            &json!({
                "on_missing": "store",
                "missing_value": 0,
                "store_callables": true,
                "precasters": ["auto"],
                "postcasters": "str",
            }),
            &registry,
        )
        .unwrap();

        let settings = Settings::from_overrides(overrides).unwrap();
        assert_eq!(settings.on_missing, Policy::Store);
        assert!(settings.store_callables);
        assert_eq!(settings.precasters.len(), 1);
        assert_eq!(settings.postcasters.len(), 1);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let registry = CasterRegistry::with_builtins();
        assert!(matches!(
            Overrides::from_json(&json!(["on_extra"]), &registry),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_from_json_unknown_caster() {
        let registry = CasterRegistry::with_builtins();
        assert!(matches!(
            Overrides::from_json(&json!({"precasters": ["decimal"]}), &registry),
            Err(Error::InvalidCaster(_))
        ));
    }

    #[test]
    fn test_from_json_policy_number_is_invalid_option() {
        let registry = CasterRegistry::with_builtins();
        let overrides = Overrides::from_json(&json!({"on_invalid": 1}), &registry).unwrap();
        assert!(matches!(
            Settings::from_overrides(overrides),
            Err(Error::InvalidOption { .. })
        ));
    }
}
