// Environment adapter
//
// Environment variables are strings. Casting them runs every value through
// the string heuristic before the field caster, and never complains about
// the unrelated variables every process environment carries.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use tracing::debug;

use crate::caster::Caster;
use crate::internal::error::Result;
use crate::processor::{effective_settings, InputData, Output, Processor};
use crate::schema::{SchemaCache, SchemaSource};
use crate::settings::{Policy, Settings, SettingsSource};

/// A string to string mapping supplier.
pub trait EnvironmentSource {
    /// A snapshot of all variables.
    fn variables(&self) -> Vec<(String, String)>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    /// Variables whose name or value is not valid unicode are skipped.
    fn variables(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }
}

impl<S: BuildHasher> EnvironmentSource for HashMap<String, String, S> {
    fn variables(&self) -> Vec<(String, String)> {
        let mut variables: Vec<_> = self
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        variables.sort();
        variables
    }
}

impl EnvironmentSource for BTreeMap<String, String> {
    fn variables(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Derives environment settings from `base`: extra variables are ignored
/// and the string heuristic runs before every other caster.
pub fn environment_settings(base: &Settings) -> Settings {
    let mut settings = base.clone();
    settings.on_extra = Policy::Ignore;
    settings.precasters.insert(0, Caster::heuristic());
    settings
}

/// Casts the variables of `environment` against `descriptor`.
pub fn cast_environment(
    environment: &dyn EnvironmentSource,
    descriptor: &dyn SchemaSource,
    settings: impl Into<SettingsSource>,
) -> Result<Output> {
    cast_environment_with_cache(SchemaCache::global(), environment, descriptor, settings)
}

pub fn cast_environment_with_cache(
    cache: &SchemaCache,
    environment: &dyn EnvironmentSource,
    descriptor: &dyn SchemaSource,
    settings: impl Into<SettingsSource>,
) -> Result<Output> {
    let schema = cache.get_or_extract(descriptor)?;
    let base = effective_settings(&schema, &settings.into())?;
    let input = InputData::from_environment(environment);
    debug!(schema = descriptor.name(), "casting environment");
    Processor::with_settings(input, schema, Arc::new(environment_settings(&base))).run()
}
