// Processor module for datacast
//
// The processor runs one cast: every schema field is resolved, cast and
// stored, then the leftover input goes through the extra-value policy.
// This module also provides the entry points tying the schema cache, the
// settings resolver and the processor together.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::caster::Caster;
use crate::internal::error::{CasterError, Error, Result};
use crate::schema::{Field, Schema, SchemaCache, SchemaSource};
use crate::settings::{Policy, Settings, SettingsSource};
use crate::value::{Record, Value};

// Re-export public types
pub use self::input::{AttributeReader, InputData};
pub use self::output::{Container, ContainerFactory, Output};

// Sub-modules
pub mod input;
pub mod output;

/// Terminal state of a single field.
#[derive(Debug)]
enum FieldOutcome {
    Include(Value),
    Skip,
}

/// Casts one input record against one schema.
#[derive(Debug)]
pub struct Processor {
    data: Record,
    schema: Arc<Schema>,
    settings: Arc<Settings>,
}

impl Processor {
    /// Creates a processor. Settings embedded in the schema take precedence
    /// over `settings`.
    pub fn new(
        input: impl Into<InputData>,
        schema: Arc<Schema>,
        settings: &SettingsSource,
    ) -> Result<Self> {
        let settings = effective_settings(&schema, settings)?;
        Ok(Self::with_settings(input, schema, settings))
    }

    /// Creates a processor with already resolved settings.
    pub fn with_settings(
        input: impl Into<InputData>,
        schema: Arc<Schema>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            data: input.into().into_record(),
            schema,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Processes every field, then the extra values.
    ///
    /// The first raising condition aborts the cast; nothing processed so
    /// far is returned.
    pub fn run(mut self) -> Result<Output> {
        let mut output = self.settings.result_container.create();
        let schema = self.schema.clone();

        for field in schema.fields() {
            match self.process_field(field)? {
                FieldOutcome::Include(value) => output.insert(field.name.clone(), value),
                FieldOutcome::Skip => trace!(field = %field.name, "field skipped"),
            }
        }

        if !self.data.is_empty() {
            self.process_extra(output.as_mut())?;
        }
        Ok(Output::new(output))
    }

    fn process_field(&mut self, field: &Field) -> Result<FieldOutcome> {
        let value = match self.data.remove(&field.name).or_else(|| field.default.clone()) {
            Some(value) => value,
            None => return self.process_missing(field),
        };

        let caster = Caster::effective(
            &self.settings.precasters,
            &field.caster,
            &self.settings.postcasters,
        );
        match caster.cast(value.clone()) {
            Ok(cast) => Ok(FieldOutcome::Include(cast)),
            Err(source) => self.process_invalid(field, value, source),
        }
    }

    fn process_missing(&self, field: &Field) -> Result<FieldOutcome> {
        match self.settings.on_missing {
            Policy::Store | Policy::Cast => Ok(FieldOutcome::Include(
                self.settings
                    .missing_value
                    .resolve(self.settings.store_callables),
            )),
            Policy::Raise => Err(Error::RequiredField(field.name.clone())),
            Policy::Ignore => Ok(FieldOutcome::Skip),
        }
    }

    fn process_invalid(
        &self,
        field: &Field,
        value: Value,
        source: CasterError,
    ) -> Result<FieldOutcome> {
        match self.settings.on_invalid {
            Policy::Store => {
                debug!(field = %field.name, error = %source, "storing value that failed to cast");
                Ok(FieldOutcome::Include(value))
            }
            Policy::Raise => Err(Error::Cast { value, source }),
            Policy::Ignore => {
                debug!(field = %field.name, error = %source, "dropping value that failed to cast");
                Ok(FieldOutcome::Skip)
            }
            Policy::Cast => Err(Error::invalid_option(Policy::Cast.as_str(), "on_invalid")),
        }
    }

    fn process_extra(&mut self, output: &mut dyn Container) -> Result<()> {
        let extra = std::mem::take(&mut self.data);
        match self.settings.on_extra {
            Policy::Store => {
                for (key, value) in extra {
                    output.insert(key, value);
                }
            }
            Policy::Cast => {
                let noop = Caster::NoOp;
                let caster = Caster::effective(
                    &self.settings.precasters,
                    &noop,
                    &self.settings.postcasters,
                );
                for (key, value) in extra {
                    let cast = caster
                        .cast(value.clone())
                        .map_err(|source| Error::Cast { value, source })?;
                    output.insert(key, cast);
                }
            }
            Policy::Raise => return Err(Error::ExtraValue(extra)),
            Policy::Ignore => {
                debug!(keys = ?extra.keys().collect::<Vec<_>>(), "ignoring extra values");
            }
        }
        Ok(())
    }
}

/// Picks the settings for a cast: the schema's embedded settings when it
/// has any, the call-site source otherwise.
pub(crate) fn effective_settings(schema: &Schema, settings: &SettingsSource) -> Result<Arc<Settings>> {
    match schema.settings() {
        Some(embedded) => {
            if !settings.is_default() {
                debug!("schema embeds settings, call-site settings are not used");
            }
            Ok(embedded.clone())
        }
        None => settings.resolve(),
    }
}

/// Casts `input` against the schema of `descriptor`, using the process-wide
/// schema cache.
pub fn cast(
    input: impl Into<InputData>,
    descriptor: &dyn SchemaSource,
    settings: impl Into<SettingsSource>,
) -> Result<Output> {
    cast_with_cache(SchemaCache::global(), input, descriptor, settings)
}

/// Casts `input` against the schema of `descriptor`, extracting it through
/// `cache`.
pub fn cast_with_cache(
    cache: &SchemaCache,
    input: impl Into<InputData>,
    descriptor: &dyn SchemaSource,
    settings: impl Into<SettingsSource>,
) -> Result<Output> {
    let schema = cache.get_or_extract(descriptor)?;
    cast_schema(input, schema, settings)
}

/// Casts `input` against an already extracted schema.
pub fn cast_schema(
    input: impl Into<InputData>,
    schema: Arc<Schema>,
    settings: impl Into<SettingsSource>,
) -> Result<Output> {
    Processor::new(input, schema, &settings.into())?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use crate::settings::{MissingValue, Overrides};

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new([
            Field::new("a", Caster::int()),
            Field::new("b", Caster::int()).with_default(0),
        ]))
    }

    fn run(input: Record, settings: Settings) -> Result<Record> {
        let output = Processor::with_settings(input, schema(), Arc::new(settings)).run()?;
        Ok(output.into_record().unwrap())
    }

    #[test]
    fn test_fields_cast_in_order() {
        let out = run(record! { "b" => "2", "a" => "1" }, Settings::default()).unwrap();
        assert_eq!(out, record! { "a" => 1, "b" => 2 });
    }

    #[test]
    fn test_missing_store_uses_missing_value() {
        let settings = Settings {
            on_missing: Policy::Store,
            missing_value: MissingValue::Value(Value::from("n/a")),
            ..Settings::default()
        };
        let out = run(record! {}, settings).unwrap();
        assert_eq!(out, record! { "a" => "n/a", "b" => 0 });
    }

    #[test]
    fn test_missing_value_is_not_cast() {
        let settings = Settings {
            on_missing: Policy::Cast,
            postcasters: vec![Caster::string()],
            ..Settings::default()
        };
        let out = run(record! {}, settings).unwrap();
        assert_eq!(out.get("a"), Some(&Value::Null));
        assert_eq!(out.get("b"), Some(&Value::from("0")));
    }

    #[test]
    fn test_invalid_policies() {
        let input = record! { "a" => "spam" };

        let err = run(input.clone(), Settings::default()).unwrap_err();
        assert!(matches!(err, Error::Cast { ref value, .. } if *value == Value::from("spam")));

        let ignore = Settings {
            on_invalid: Policy::Ignore,
            ..Settings::default()
        };
        assert_eq!(run(input.clone(), ignore).unwrap(), record! { "b" => 0 });

        let cast = Settings {
            on_invalid: Policy::Cast,
            ..Settings::default()
        };
        assert!(matches!(
            run(input, cast),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_extra_policies() {
        let input = record! { "a" => 1, "z" => "26" };

        let store = Settings {
            on_extra: Policy::Store,
            ..Settings::default()
        };
        assert_eq!(
            run(input.clone(), store).unwrap(),
            record! { "a" => 1, "b" => 0, "z" => "26" }
        );

        let cast = Settings {
            on_extra: Policy::Cast,
            precasters: vec![Caster::heuristic()],
            ..Settings::default()
        };
        assert_eq!(
            run(input.clone(), cast).unwrap(),
            record! { "a" => 1, "b" => 0, "z" => 26 }
        );

        let raise = Settings {
            on_extra: Policy::Raise,
            ..Settings::default()
        };
        match run(input, raise) {
            Err(Error::ExtraValue(extra)) => assert_eq!(extra, record! { "z" => "26" }),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_embedded_settings_take_precedence() {
        let embedded = Arc::new(Settings {
            on_missing: Policy::Ignore,
            ..Settings::default()
        });
        let schema = Arc::new(Schema::new([Field::new("a", Caster::int())]).with_settings(embedded));
        let overrides = Overrides::new().set("on_missing", "raise");
        let out = cast_schema(record! {}, schema, overrides).unwrap();
        assert!(out.into_record().unwrap().is_empty());
    }
}
