// Schema descriptors
//
// A descriptor is anything a schema can be extracted from. Two shapes are
// provided: field lists, which model a record type with declared fields,
// class-level defaults and single inheritance, and parameter lists, which
// model a callable's parameters.

use std::any::TypeId;
use std::collections::HashSet;
use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::caster::Caster;
use crate::internal::error::Result;
use crate::schema::types::Field;
use crate::settings::SettingsSource;
use crate::value::{Record, Value};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Identity of a descriptor, used as the schema cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKey {
    /// A descriptor bound to a Rust type
    Type(TypeId),
    /// A descriptor built at runtime
    Instance(u64),
}

impl DescriptorKey {
    /// A key never handed out before.
    pub fn fresh() -> Self {
        DescriptorKey::Instance(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn of<T: 'static>() -> Self {
        DescriptorKey::Type(TypeId::of::<T>())
    }
}

/// Something a [`Schema`](crate::schema::Schema) can be extracted from.
pub trait SchemaSource: Send + Sync {
    /// Stable identity; equal keys must yield equal schemas.
    fn key(&self) -> DescriptorKey;

    /// Human readable name, used in logs.
    fn name(&self) -> &str;

    /// Field declarations in order. Duplicates are dropped by the schema,
    /// first occurrence wins.
    fn declarations(&self) -> Result<Vec<Field>>;

    /// Settings embedded in the descriptor.
    fn settings(&self) -> Option<SettingsSource> {
        None
    }
}

/// A record-type descriptor.
///
/// Fields are declared with a caster (or explicitly untyped), attributes
/// hold default values, and a base list contributes the fields it declares
/// after this list's own.
#[derive(Debug)]
pub struct FieldList {
    key: DescriptorKey,
    name: String,
    declared: Vec<(String, Caster)>,
    attributes: Record,
    base: Option<Arc<FieldList>>,
    settings: Option<SettingsSource>,
}

impl FieldList {
    pub fn new(name: &str) -> Self {
        Self::with_key(name, DescriptorKey::fresh())
    }

    /// A field list whose identity is the type `T`.
    pub fn for_type<T: 'static>(name: &str) -> Self {
        Self::with_key(name, DescriptorKey::of::<T>())
    }

    fn with_key(name: &str, key: DescriptorKey) -> Self {
        Self {
            key,
            name: name.to_string(),
            declared: Vec::new(),
            attributes: Record::new(),
            base: None,
            settings: None,
        }
    }

    /// Declares a field. Redeclaring a name replaces its caster in place.
    pub fn field(mut self, name: &str, caster: Caster) -> Self {
        match self.declared.iter_mut().find(|(declared, _)| declared == name) {
            Some(entry) => entry.1 = caster,
            None => self.declared.push((name.to_string(), caster)),
        }
        self
    }

    /// Declares a field with a default value.
    pub fn field_with_default(self, name: &str, caster: Caster, default: impl Into<Value>) -> Self {
        self.field(name, caster).attribute(name, default)
    }

    /// Declares a field with no caster; its value is accepted unchanged.
    pub fn untyped(self, name: &str) -> Self {
        self.field(name, Caster::NoOp)
    }

    /// Sets a class-level attribute. Attributes named like a declared field
    /// (here or in a base) are that field's default.
    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn extends(mut self, base: Arc<FieldList>) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_settings(mut self, settings: impl Into<SettingsSource>) -> Self {
        self.settings = Some(settings.into());
        self
    }

    /// This list followed by its bases, most derived first.
    fn layers(&self) -> impl Iterator<Item = &FieldList> {
        iter::successors(Some(self), |layer| layer.base.as_deref())
    }

    fn default_of(&self, name: &str) -> Option<Value> {
        self.layers()
            .find_map(|layer| layer.attributes.get(name).cloned())
    }
}

impl SchemaSource for FieldList {
    fn key(&self) -> DescriptorKey {
        self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declarations(&self) -> Result<Vec<Field>> {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for layer in self.layers() {
            for (name, caster) in &layer.declared {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                fields.push(Field {
                    name: name.clone(),
                    caster: caster.clone(),
                    default: self.default_of(name),
                });
            }
        }
        Ok(fields)
    }

    fn settings(&self) -> Option<SettingsSource> {
        self.layers().find_map(|layer| layer.settings.clone())
    }
}

/// One parameter of a parameter list.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    /// Parameters without a caster are not part of the schema
    pub caster: Option<Caster>,
    pub default: Option<Value>,
}

/// A callable-signature descriptor.
#[derive(Debug)]
pub struct ParameterList {
    key: DescriptorKey,
    name: String,
    parameters: Vec<Parameter>,
    settings: Option<SettingsSource>,
}

impl ParameterList {
    pub fn new(name: &str) -> Self {
        Self {
            key: DescriptorKey::fresh(),
            name: name.to_string(),
            parameters: Vec::new(),
            settings: None,
        }
    }

    /// Adds a parameter, replacing one of the same name in place.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
        self
    }

    pub fn param(self, name: &str, caster: Caster) -> Self {
        self.parameter(Parameter {
            name: name.to_string(),
            caster: Some(caster),
            default: None,
        })
    }

    pub fn param_with_default(self, name: &str, caster: Caster, default: impl Into<Value>) -> Self {
        self.parameter(Parameter {
            name: name.to_string(),
            caster: Some(caster),
            default: Some(default.into()),
        })
    }

    /// Adds a parameter without a caster, which the schema skips.
    pub fn untyped(self, name: &str) -> Self {
        self.parameter(Parameter {
            name: name.to_string(),
            caster: None,
            default: None,
        })
    }

    pub fn with_settings(mut self, settings: impl Into<SettingsSource>) -> Self {
        self.settings = Some(settings.into());
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl SchemaSource for ParameterList {
    fn key(&self) -> DescriptorKey {
        self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declarations(&self) -> Result<Vec<Field>> {
        Ok(self
            .parameters
            .iter()
            .filter_map(|parameter| {
                parameter.caster.clone().map(|caster| Field {
                    name: parameter.name.clone(),
                    caster,
                    default: parameter.default.clone(),
                })
            })
            .collect())
    }

    fn settings(&self) -> Option<SettingsSource> {
        self.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::settings::{Overrides, Policy};

    fn names(source: &dyn SchemaSource) -> Vec<String> {
        source
            .declarations()
            .unwrap()
            .into_iter()
            .map(|field| field.name)
            .collect()
    }

    #[test]
    fn test_fresh_keys_differ() {
        assert_ne!(DescriptorKey::fresh(), DescriptorKey::fresh());
        assert_eq!(DescriptorKey::of::<u8>(), DescriptorKey::of::<u8>());
    }

    #[test]
    fn test_field_list_inheritance() {
        let base = Arc::new(
            FieldList::new("Base")
                .field("a", Caster::int())
                .field("shared", Caster::int())
                .attribute("shared", 1),
        );
        let derived = FieldList::new("Derived")
            .field("b", Caster::string())
            .field("shared", Caster::string())
            .attribute("a", 5)
            .extends(base);

        assert_eq!(names(&derived), vec!["b", "shared", "a"]);
        let fields = derived.declarations().unwrap();
        assert_eq!(fields[1].caster.to_string(), "str");
        assert_eq!(fields[1].default, Some(Value::Int(1)));
        assert_eq!(fields[2].default, Some(Value::Int(5)));
    }

    #[test]
    fn test_attributes_without_declaration_are_not_fields() {
        let list = FieldList::new("Config").untyped("a").attribute("helper", 3);
        assert_eq!(names(&list), vec!["a"]);
    }

    #[test]
    fn test_settings_are_inherited() {
        let base = Arc::new(
            FieldList::new("Base").with_settings(Overrides::new().set("on_extra", "raise")),
        );
        let derived = FieldList::new("Derived").extends(base);
        let schema = Schema::from_source(&derived).unwrap();
        assert_eq!(schema.settings().map(|s| s.on_extra), Some(Policy::Raise));
    }

    #[test]
    fn test_parameter_list_skips_untyped() {
        let params = ParameterList::new("connect")
            .param("host", Caster::string())
            .untyped("flags")
            .param_with_default("port", Caster::int(), 8080);
        assert_eq!(names(&params), vec!["host", "port"]);
        assert_eq!(params.parameters().len(), 3);
    }
}
