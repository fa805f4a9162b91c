// Settings module for datacast
//
// Settings govern how the processor treats missing, invalid and extra
// values. This module provides:
//
// 1. The `Policy` for each of those three situations
// 2. The resolved, immutable `Settings` record and its defaults
// 3. `SettingsSource`, the three ways to obtain settings
// 4. Partial overrides layered on top of the defaults
// 5. Missing-value synthesis

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::caster::Caster;
use crate::internal::error::{Error, Result};
use crate::processor::ContainerFactory;

// Re-export public types
pub use self::missing::MissingValue;
pub use self::overrides::{OptionValue, Overrides};

// Sub-modules
pub mod missing;
pub mod overrides;

/// Recognized settings options, in the order overrides are applied.
pub const OPTIONS: [&str; 8] = [
    "on_extra",
    "on_invalid",
    "on_missing",
    "missing_value",
    "store_callables",
    "result_container",
    "precasters",
    "postcasters",
];

/// What to do in a missing, invalid or extra situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Keep the value (or a synthesized missing value)
    Store,
    /// Run the value through the casters
    Cast,
    /// Abort the whole cast with an error
    Raise,
    /// Drop the value silently
    Ignore,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Store => "store",
            Policy::Cast => "cast",
            Policy::Raise => "raise",
            Policy::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "store" => Ok(Policy::Store),
            "cast" => Ok(Policy::Cast),
            "raise" => Ok(Policy::Raise),
            "ignore" => Ok(Policy::Ignore),
            other => Err(Error::invalid_option(other, "policy")),
        }
    }
}

/// Fully resolved settings. Immutable once built and shared through `Arc`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Policy for input keys no field consumes
    pub on_extra: Policy,

    /// Policy for values a caster rejects
    pub on_invalid: Policy,

    /// Policy for fields with neither input value nor default
    pub on_missing: Policy,

    /// Value synthesized for missing fields under `store`
    pub missing_value: MissingValue,

    /// Whether a callable missing value is stored as is instead of invoked
    pub store_callables: bool,

    /// Builds the output container
    pub result_container: ContainerFactory,

    /// Casters applied before every field caster
    pub precasters: Vec<Caster>,

    /// Casters applied after every field caster
    pub postcasters: Vec<Caster>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            on_extra: Policy::Ignore,
            on_invalid: Policy::Raise,
            on_missing: Policy::Raise,
            missing_value: MissingValue::default(),
            store_callables: false,
            result_container: ContainerFactory::record(),
            precasters: Vec::new(),
            postcasters: Vec::new(),
        }
    }
}

impl Settings {
    /// Builds settings from a defaults profile.
    pub fn from_defaults(profile: fn() -> Settings) -> Arc<Settings> {
        Arc::new(profile())
    }

    /// Uses an already built settings instance.
    pub fn from_instance(settings: Arc<Settings>) -> Arc<Settings> {
        settings
    }

    /// Layers overrides on top of the default profile.
    ///
    /// A nested `settings` entry holding a built instance wins over every
    /// other key. Unrecognized keys are ignored.
    pub fn from_overrides(mut overrides: Overrides) -> Result<Arc<Settings>> {
        if let Some(OptionValue::Settings(nested)) = overrides.remove("settings") {
            return Ok(nested);
        }

        let mut settings = Settings::default();
        for option in OPTIONS {
            if overrides.is_empty() {
                break;
            }
            if let Some(value) = overrides.remove(option) {
                settings.apply(option, value)?;
            }
        }

        if !overrides.is_empty() {
            debug!(
                keys = ?overrides.keys().collect::<Vec<_>>(),
                "ignoring unrecognized settings options"
            );
        }
        Ok(Arc::new(settings))
    }

    fn apply(&mut self, option: &str, value: OptionValue) -> Result<()> {
        match (option, value) {
            ("on_extra", value) => self.on_extra = policy(option, value)?,
            ("on_invalid", value) => self.on_invalid = policy(option, value)?,
            ("on_missing", value) => self.on_missing = policy(option, value)?,
            ("missing_value", OptionValue::Value(value)) => {
                self.missing_value = MissingValue::Value(value)
            }
            ("missing_value", OptionValue::Text(text)) => {
                self.missing_value = MissingValue::Value(text.into())
            }
            ("missing_value", OptionValue::Flag(flag)) => {
                self.missing_value = MissingValue::Value(flag.into())
            }
            ("missing_value", OptionValue::Factory(factory)) => {
                self.missing_value = MissingValue::Factory(factory)
            }
            ("store_callables", OptionValue::Flag(flag)) => self.store_callables = flag,
            ("result_container", OptionValue::Container(factory)) => {
                self.result_container = factory
            }
            ("precasters", OptionValue::Casters(casters)) => self.precasters = casters,
            ("postcasters", OptionValue::Casters(casters)) => self.postcasters = casters,
            (option, value) => return Err(Error::invalid_option(value.describe(), option)),
        }
        Ok(())
    }
}

fn policy(option: &str, value: OptionValue) -> Result<Policy> {
    match value {
        OptionValue::Policy(policy) => Ok(policy),
        OptionValue::Text(text) => text
            .parse::<Policy>()
            .map_err(|_| Error::invalid_option(text, option)),
        other => Err(Error::invalid_option(other.describe(), option)),
    }
}

/// Where a cast gets its settings from.
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// A defaults profile
    Defaults(fn() -> Settings),
    /// An existing instance, used as is
    Instance(Arc<Settings>),
    /// Partial overrides on top of the default profile
    Overrides(Overrides),
}

impl SettingsSource {
    pub fn resolve(&self) -> Result<Arc<Settings>> {
        match self {
            SettingsSource::Defaults(profile) => Ok(Settings::from_defaults(*profile)),
            SettingsSource::Instance(settings) => Ok(Settings::from_instance(settings.clone())),
            SettingsSource::Overrides(overrides) => Settings::from_overrides(overrides.clone()),
        }
    }

    /// Whether this source carries anything beyond the default profile.
    pub fn is_default(&self) -> bool {
        match self {
            SettingsSource::Defaults(_) => true,
            SettingsSource::Overrides(overrides) => overrides.is_empty(),
            SettingsSource::Instance(_) => false,
        }
    }
}

impl Default for SettingsSource {
    fn default() -> Self {
        SettingsSource::Defaults(Settings::default)
    }
}

impl From<Settings> for SettingsSource {
    fn from(settings: Settings) -> Self {
        SettingsSource::Instance(Arc::new(settings))
    }
}

impl From<Arc<Settings>> for SettingsSource {
    fn from(settings: Arc<Settings>) -> Self {
        SettingsSource::Instance(settings)
    }
}

impl From<Overrides> for SettingsSource {
    fn from(overrides: Overrides) -> Self {
        SettingsSource::Overrides(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.on_extra, Policy::Ignore);
        assert_eq!(settings.on_invalid, Policy::Raise);
        assert_eq!(settings.on_missing, Policy::Raise);
        assert_eq!(settings.missing_value, MissingValue::Value(Value::Null));
        assert!(!settings.store_callables);
        assert!(settings.precasters.is_empty());
        assert!(settings.postcasters.is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("store".parse::<Policy>().unwrap(), Policy::Store);
        assert_eq!("ignore".parse::<Policy>().unwrap(), Policy::Ignore);
        assert!(matches!(
            "STORE".parse::<Policy>(),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_overrides_layer_on_defaults() {
        let overrides = Overrides::new()
            .set("on_missing", "store")
            .set("missing_value", Value::Int(0))
            .set("postcasters", vec![Caster::string()]);
        let settings = Settings::from_overrides(overrides).unwrap();
        assert_eq!(settings.on_missing, Policy::Store);
        assert_eq!(settings.on_extra, Policy::Ignore);
        assert_eq!(settings.missing_value, MissingValue::Value(Value::Int(0)));
        assert_eq!(settings.postcasters.len(), 1);
    }

    #[test]
    fn test_false_like_missing_value_is_stored() {
        let schema = crate::schema::FieldList::new("Counts")
            .field("hits", Caster::int())
            .field("label", Caster::NoOp);
        for zero in [Value::Int(0), Value::from(""), Value::Bool(false)] {
            let overrides = Overrides::new()
                .set("on_missing", Policy::Store)
                .set("missing_value", zero.clone());
            let output = crate::processor::cast(crate::record! {}, &schema, overrides).unwrap();
            let record = output.into_record().unwrap();
            assert_eq!(record.get("hits"), Some(&zero));
            assert_eq!(record.get("label"), Some(&zero));
        }
    }

    #[test]
    fn test_nested_instance_wins() {
        let nested = Arc::new(Settings {
            on_extra: Policy::Raise,
            ..Settings::default()
        });
        let overrides = Overrides::new()
            .set("on_extra", Policy::Store)
            .set("settings", nested.clone());
        let settings = Settings::from_overrides(overrides).unwrap();
        assert!(Arc::ptr_eq(&settings, &nested));
    }

    #[test]
    fn test_unknown_policy_text_is_invalid_option() {
        let overrides = Overrides::new().set("on_extra", "explode");
        match Settings::from_overrides(overrides) {
            Err(Error::InvalidOption { option, context }) => {
                assert_eq!(option, "explode");
                assert_eq!(context, "on_extra");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_option_type_is_invalid_option() {
        let overrides = Overrides::new().set("store_callables", Value::Int(1));
        assert!(matches!(
            Settings::from_overrides(overrides),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let overrides = Overrides::new().set("on_everything", "raise");
        let settings = Settings::from_overrides(overrides).unwrap();
        assert_eq!(settings.on_invalid, Policy::Raise);
    }

    #[test]
    fn test_source_resolution() {
        assert!(SettingsSource::default().is_default());
        let instance = Arc::new(Settings::default());
        let resolved = SettingsSource::from(instance.clone()).resolve().unwrap();
        assert!(Arc::ptr_eq(&resolved, &instance));
    }
}
