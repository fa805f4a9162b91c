// Config objects
//
// A config is a schema and a result in one: loading it casts an input
// against its own declared fields. `ConfigObject` is the dynamic form, the
// `Config` trait the typed form, materialized through serde.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::environ::{self, EnvironmentSource, ProcessEnvironment};
use crate::internal::error::{Error, Result};
use crate::processor::{self, AttributeReader, InputData, Output};
use crate::schema::{DescriptorKey, Field, FieldList, SchemaSource};
use crate::settings::SettingsSource;
use crate::value::{Record, Value};

/// The populated fields of a cast, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigObject {
    values: Record,
}

impl ConfigObject {
    /// Casts `input` against `descriptor` and keeps the result.
    pub fn load(
        input: impl Into<InputData>,
        descriptor: &dyn SchemaSource,
        settings: impl Into<SettingsSource>,
    ) -> Result<Self> {
        let output = processor::cast(input, descriptor, settings)?;
        Ok(Self {
            values: into_record(output)?,
        })
    }

    /// Casts the variables of `environment` against `descriptor`.
    pub fn from_environment(
        environment: &dyn EnvironmentSource,
        descriptor: &dyn SchemaSource,
        settings: impl Into<SettingsSource>,
    ) -> Result<Self> {
        let output = environ::cast_environment(environment, descriptor, settings)?;
        Ok(Self {
            values: into_record(output)?,
        })
    }

    /// Names of the populated fields.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_record(&self) -> &Record {
        &self.values
    }

    pub fn into_record(self) -> Record {
        self.values
    }
}

/// A loaded config can itself be the input of another cast.
impl AttributeReader for ConfigObject {
    fn attribute_names(&self) -> Vec<String> {
        self.values.keys().map(str::to_string).collect()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

fn into_record(output: Output) -> Result<Record> {
    output
        .into_record()
        .ok_or_else(|| Error::invalid_option("custom container", "result_container"))
}

/// A typed config.
///
/// The type declares its fields; the cast record is then deserialized into
/// the type. The schema is cached under the type's identity.
///
/// ```
/// use datacast::{Caster, Config, FieldList};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Server {
///     host: String,
///     port: i64,
/// }
///
/// impl Config for Server {
///     fn fields() -> FieldList {
///         FieldList::new("Server")
///             .field_with_default("host", Caster::string(), "localhost")
///             .field("port", Caster::int())
///     }
/// }
///
/// let server = Server::load(datacast::record! { "port" => "8080" }).unwrap();
/// assert_eq!(server.host, "localhost");
/// assert_eq!(server.port, 8080);
/// ```
pub trait Config: DeserializeOwned + Send + Sync + 'static {
    /// Declares the fields of this config.
    fn fields() -> FieldList;

    /// Settings used by [`Config::load`] and [`Config::from_environment`].
    fn settings() -> SettingsSource {
        SettingsSource::default()
    }

    /// Casts `input` and deserializes the result.
    fn load(input: impl Into<InputData>) -> Result<Self> {
        let output = processor::cast(input, &TypedSource::<Self>::new(), Self::settings())?;
        materialize(output)
    }

    /// Casts the process environment and deserializes the result.
    fn from_environment() -> Result<Self> {
        Self::from_environment_source(&ProcessEnvironment)
    }

    /// Casts `environment` and deserializes the result.
    fn from_environment_source(environment: &dyn EnvironmentSource) -> Result<Self> {
        let output = environ::cast_environment(
            environment,
            &TypedSource::<Self>::new(),
            Self::settings(),
        )?;
        materialize(output)
    }
}

fn materialize<C: Config>(output: Output) -> Result<C> {
    let json = serde_json::to_value(into_record(output)?)?;
    Ok(serde_json::from_value(json)?)
}

/// Presents a typed config's field list under the type's identity.
struct TypedSource<C> {
    fields: Arc<FieldList>,
    marker: PhantomData<fn() -> C>,
}

impl<C: Config> TypedSource<C> {
    fn new() -> Self {
        Self {
            fields: Arc::new(C::fields()),
            marker: PhantomData,
        }
    }
}

impl<C: Config> SchemaSource for TypedSource<C> {
    fn key(&self) -> DescriptorKey {
        DescriptorKey::of::<C>()
    }

    fn name(&self) -> &str {
        self.fields.name()
    }

    fn declarations(&self) -> Result<Vec<Field>> {
        self.fields.declarations()
    }

    fn settings(&self) -> Option<SettingsSource> {
        self.fields.settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caster::Caster;
    use crate::record;
    use crate::settings::Overrides;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize)]
    struct Limits {
        retries: i64,
        ratio: f64,
        label: Option<String>,
    }

    impl Config for Limits {
        fn fields() -> FieldList {
            FieldList::new("Limits")
                .field("retries", Caster::int())
                .field_with_default("ratio", Caster::float(), 0.5)
                .field_with_default("label", Caster::NoOp, Value::Null)
        }
    }

    #[test]
    fn test_config_object_keys() {
        let schema = FieldList::new("Pair")
            .field("a", Caster::int())
            .field_with_default("b", Caster::int(), 2);
        let config = ConfigObject::load(record! { "a" => "1" }, &schema, SettingsSource::default())
            .unwrap();
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(config.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_config_object_as_input() {
        let schema = FieldList::new("Single").field("a", Caster::string());
        let first = ConfigObject::load(record! { "a" => 1 }, &schema, SettingsSource::default())
            .unwrap();
        let second = ConfigObject::load(
            InputData::from_attributes(&first),
            &schema,
            SettingsSource::default(),
        )
        .unwrap();
        assert_eq!(second.get("a"), Some(&Value::from("1")));
    }

    #[test]
    fn test_typed_config() {
        let limits = Limits::load(record! { "retries" => "3" }).unwrap();
        assert_eq!(limits.retries, 3);
        assert_eq!(limits.ratio, 0.5);
        assert_eq!(limits.label, None);
    }

    #[test]
    fn test_typed_config_required_field() {
        assert!(matches!(
            Limits::load(record! {}),
            Err(Error::RequiredField(name)) if name == "retries"
        ));
    }

    #[test]
    fn test_typed_config_from_environment() {
        let mut vars = BTreeMap::new();
        vars.insert("retries".to_string(), "5".to_string());
        vars.insert("ratio".to_string(), "1e-1".to_string());
        let limits = Limits::from_environment_source(&vars).unwrap();
        assert_eq!(limits.retries, 5);
        assert_eq!(limits.ratio, 0.1);
    }

    #[test]
    fn test_materialize_type_mismatch() {
        let schema = FieldList::new("Loose").untyped("retries").untyped("ratio");
        let output = processor::cast(
            record! { "retries" => "many", "ratio" => 1.0 },
            &schema,
            Overrides::new(),
        )
        .unwrap();
        assert!(matches!(
            materialize::<Limits>(output),
            Err(Error::Materialize(_))
        ));
    }
}
