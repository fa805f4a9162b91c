// Schema types for datacast
//
// A schema is the ordered list of fields extracted from a descriptor,
// together with any settings the descriptor embeds.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::caster::Caster;
use crate::internal::error::Result;
use crate::schema::source::SchemaSource;
use crate::settings::Settings;
use crate::value::Value;

/// A single schema field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name, unique within a schema
    pub name: String,

    /// Caster applied to the field's value
    pub caster: Caster,

    /// Value used when the input lacks the field
    pub default: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, caster: Caster) -> Self {
        Self {
            name: name.into(),
            caster,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// A field without a default must come from the input.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered fields plus optional embedded settings.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    settings: Option<Arc<Settings>>,
}

impl Schema {
    /// Creates a schema from fields. Later duplicates of a name are dropped.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        let mut seen = HashSet::new();
        let fields = fields
            .into_iter()
            .filter(|field| seen.insert(field.name.clone()))
            .collect();
        Self {
            fields,
            settings: None,
        }
    }

    /// Attaches embedded settings, which take precedence over call-site
    /// settings.
    pub fn with_settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Extracts the schema of a descriptor, resolving its embedded settings.
    pub fn from_source(source: &dyn SchemaSource) -> Result<Self> {
        let mut schema = Schema::new(source.declarations()?);
        if let Some(settings) = source.settings() {
            schema.settings = Some(settings.resolve()?);
        }
        debug!(
            schema = source.name(),
            fields = schema.len(),
            embedded_settings = schema.settings.is_some(),
            "extracted schema"
        );
        Ok(schema)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn settings(&self) -> Option<&Arc<Settings>> {
        self.settings.as_ref()
    }

    /// Removes the named fields in place.
    pub fn exclude<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let names: HashSet<&str> = names.into_iter().collect();
        self.fields.retain(|field| !names.contains(field.name.as_str()));
    }

    /// Returns a copy without the named fields. Cached schemas are shared,
    /// so callers narrow a copy rather than the cached value.
    pub fn without<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Schema {
        let mut schema = self.clone();
        schema.exclude(names);
        schema
    }
}
