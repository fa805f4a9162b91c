// Input normalization
//
// Every input shape is normalized into a `Record` the processor consumes
// destructively. Callers keep their own input untouched.

use serde_json::Value as Json;

use crate::environ::EnvironmentSource;
use crate::internal::error::{Error, Result};
use crate::value::{Record, Value};

/// An object exposing its attributes by name.
pub trait AttributeReader {
    /// Attribute names in declaration order.
    fn attribute_names(&self) -> Vec<String>;

    fn attribute(&self, name: &str) -> Option<Value>;
}

/// The normalized key/value view of a cast input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputData(Record);

impl InputData {
    /// Reads the public attributes of an object; names starting with an
    /// underscore are skipped.
    pub fn from_attributes(object: &dyn AttributeReader) -> Self {
        let record = object
            .attribute_names()
            .into_iter()
            .filter(|name| !name.starts_with('_'))
            .filter_map(|name| object.attribute(&name).map(|value| (name, value)))
            .collect();
        InputData(record)
    }

    /// Snapshots an environment.
    pub fn from_environment(environment: &dyn EnvironmentSource) -> Self {
        InputData(
            environment
                .variables()
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect(),
        )
    }

    pub fn into_record(self) -> Record {
        self.0
    }
}

impl From<Record> for InputData {
    fn from(record: Record) -> Self {
        InputData(record)
    }
}

/// An absent input is an empty record.
impl From<Option<Record>> for InputData {
    fn from(record: Option<Record>) -> Self {
        InputData(record.unwrap_or_default())
    }
}

impl From<&Record> for InputData {
    fn from(record: &Record) -> Self {
        InputData(record.clone())
    }
}

impl TryFrom<Json> for InputData {
    type Error = Error;

    fn try_from(json: Json) -> Result<Self> {
        match json {
            Json::Object(map) => Ok(InputData(map.into())),
            Json::Null => Ok(InputData::default()),
            other => Err(Error::InvalidInput(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde_json::json;

    struct Point {
        x: i64,
        y: i64,
    }

    impl AttributeReader for Point {
        fn attribute_names(&self) -> Vec<String> {
            vec!["x".to_string(), "y".to_string(), "_cache".to_string()]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "x" => Some(Value::Int(self.x)),
                "y" => Some(Value::Int(self.y)),
                "_cache" => Some(Value::Null),
                _ => None,
            }
        }
    }

    #[test]
    fn test_attributes_skip_private_names() {
        let input = InputData::from_attributes(&Point { x: 1, y: 2 });
        assert_eq!(input.into_record(), record! { "x" => 1, "y" => 2 });
    }

    #[test]
    fn test_absent_input_is_empty() {
        assert!(InputData::from(None::<Record>).into_record().is_empty());
    }

    #[test]
    fn test_json_input() {
        let input = InputData::try_from(json!({"a": 1})).unwrap();
        assert_eq!(input.into_record(), record! { "a" => 1 });
        assert!(matches!(
            InputData::try_from(json!([1, 2])),
            Err(Error::InvalidInput(_))
        ));
    }
}
