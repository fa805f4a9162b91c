// Declarative schema documents
//
// This module parses JSON schema documents into descriptors:
//
//   {"name": "Server", "fields": ["debug", {"name": "port", "caster": "int", "default": 80}]}
//   {"name": "connect", "parameters": [{"name": "host", "caster": "str"}, "flags"]}
//
// Either shape may carry a "settings" object of overrides.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::caster::CasterRegistry;
use crate::internal::error::{Error, Result};
use crate::schema::source::{FieldList, Parameter, ParameterList, SchemaSource};
use crate::settings::Overrides;
use crate::value::Value;

/// Parser for JSON schema documents
#[derive(Debug, Clone)]
pub struct SchemaParser {
    /// Caster names available to documents
    registry: CasterRegistry,
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaParser {
    /// Creates a parser that knows the built-in casters
    pub fn new() -> Self {
        Self::with_registry(CasterRegistry::with_builtins())
    }

    pub fn with_registry(registry: CasterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CasterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CasterRegistry {
        &mut self.registry
    }

    /// Parses schema document text.
    pub fn parse_str(&self, text: &str) -> Result<Arc<dyn SchemaSource>> {
        let json: Json = serde_json::from_str(text)
            .map_err(|e| Error::InvalidSchema(format!("malformed schema document: {}", e)))?;
        self.parse(&json)
    }

    /// Parses a schema document into a field list or a parameter list.
    pub fn parse(&self, json: &Json) -> Result<Arc<dyn SchemaSource>> {
        let obj = match json {
            Json::Object(obj) => obj,
            other => return Err(Error::InvalidSchema(other.to_string())),
        };

        let name = match obj.get("name") {
            None => "schema",
            Some(Json::String(name)) => name.as_str(),
            Some(other) => {
                return Err(Error::InvalidSchema(format!("schema name must be a string, got {}", other)))
            }
        };

        let settings = match obj.get("settings") {
            Some(settings) => Some(Overrides::from_json(settings, &self.registry)?),
            None => None,
        };

        match (obj.get("fields"), obj.get("parameters")) {
            (Some(fields), None) => {
                let mut list = self.parse_fields(name, fields)?;
                if let Some(settings) = settings {
                    list = list.with_settings(settings);
                }
                Ok(Arc::new(list))
            }
            (None, Some(parameters)) => {
                let mut list = self.parse_parameters(name, parameters)?;
                if let Some(settings) = settings {
                    list = list.with_settings(settings);
                }
                Ok(Arc::new(list))
            }
            (Some(_), Some(_)) => Err(Error::InvalidSchema(format!(
                "{}: a schema has either fields or parameters, not both",
                name
            ))),
            (None, None) => Err(Error::InvalidSchema(format!(
                "{}: neither fields nor parameters",
                name
            ))),
        }
    }

    fn parse_fields(&self, name: &str, fields: &Json) -> Result<FieldList> {
        let mut list = FieldList::new(name);
        for entry in self.entries(name, fields)? {
            list = match entry {
                Json::String(field) => list.untyped(field),
                Json::Object(obj) => {
                    let field = self.get_name(name, obj)?;
                    let caster = match obj.get("caster") {
                        Some(description) => self.registry.parse(description)?,
                        None => Default::default(),
                    };
                    match obj.get("default") {
                        Some(default) => {
                            list.field_with_default(field, caster, Value::from(default.clone()))
                        }
                        None => list.field(field, caster),
                    }
                }
                other => {
                    return Err(Error::InvalidSchema(format!(
                        "{}: invalid field entry {}",
                        name, other
                    )))
                }
            };
        }
        Ok(list)
    }

    fn parse_parameters(&self, name: &str, parameters: &Json) -> Result<ParameterList> {
        let mut list = ParameterList::new(name);
        for entry in self.entries(name, parameters)? {
            list = match entry {
                Json::String(parameter) => list.untyped(parameter),
                Json::Object(obj) => {
                    let caster = match obj.get("caster") {
                        Some(description) => Some(self.registry.parse(description)?),
                        None => None,
                    };
                    list.parameter(Parameter {
                        name: self.get_name(name, obj)?.to_string(),
                        caster,
                        default: obj.get("default").cloned().map(Value::from),
                    })
                }
                other => {
                    return Err(Error::InvalidSchema(format!(
                        "{}: invalid parameter entry {}",
                        name, other
                    )))
                }
            };
        }
        Ok(list)
    }

    fn entries<'a>(&self, name: &str, json: &'a Json) -> Result<&'a Vec<Json>> {
        json.as_array().ok_or_else(|| {
            Error::InvalidSchema(format!("{}: expected an array, got {}", name, json))
        })
    }

    fn get_name<'a>(&self, schema: &str, obj: &'a Map<String, Json>) -> Result<&'a str> {
        match obj.get("name") {
            Some(Json::String(name)) => Ok(name),
            _ => Err(Error::InvalidSchema(format!(
                "{}: entry without a string name",
                schema
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::settings::Policy;
    use serde_json::json;

    #[test]
    fn test_parse_field_document() {
        let parser = SchemaParser::new();
        let source = parser
            .parse(&json!({
                "name": "Server",
                "fields": [
                    "debug",
                    {"name": "port", "caster": "int", "default": 80},
                    {"name": "ratio", "caster": ["float"]}
                ],
                "settings": {"on_extra": "raise"}
            }))
            .unwrap();

        let schema = Schema::from_source(source.as_ref()).unwrap();
        let names: Vec<_> = schema.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["debug", "port", "ratio"]);
        assert!(schema.get("debug").unwrap().caster.is_noop());
        assert_eq!(schema.get("port").unwrap().default, Some(Value::Int(80)));
        assert_eq!(schema.settings().map(|s| s.on_extra), Some(Policy::Raise));
    }

    #[test]
    fn test_parse_parameter_document() {
        let parser = SchemaParser::new();
        let source = parser
            .parse_str(r#"{"parameters": [{"name": "host", "caster": "str"}, "flags", {"name": "opts"}]}"#)
            .unwrap();
        let schema = Schema::from_source(source.as_ref()).unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(source.name(), "schema");
    }

    #[test]
    fn test_invalid_documents() {
        let parser = SchemaParser::new();
        for doc in [
            json!(42),
            json!("fields"),
            json!({"name": "Empty"}),
            json!({"fields": [], "parameters": []}),
            json!({"fields": {"a": "int"}}),
            json!({"fields": [1]}),
            json!({"fields": [{"caster": "int"}]}),
        ] {
            assert!(
                matches!(parser.parse(&doc), Err(Error::InvalidSchema(_))),
                "accepted {}",
                doc
            );
        }
        assert!(matches!(parser.parse_str("{"), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_invalid_caster_description() {
        let parser = SchemaParser::new();
        let doc = json!({"fields": [{"name": "a", "caster": {"type": "int"}}]});
        assert!(matches!(parser.parse(&doc), Err(Error::InvalidCaster(_))));
    }
}
