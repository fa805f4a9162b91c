// datacast library entry point
//
// Casts loosely structured records into validated records, driven by a
// schema and a set of missing/invalid/extra value policies.

//! Schema-driven casting of loosely structured records.
//!
//! ```
//! use datacast::{cast, record, Caster, FieldList, Overrides, Value};
//!
//! let schema = FieldList::new("Item")
//!     .field("id", Caster::int())
//!     .field_with_default("tags", Caster::list(), Value::List(vec![]));
//!
//! let output = cast(record! { "id" => "7", "note" => "x" }, &schema, Overrides::new()).unwrap();
//! let record = output.into_record().unwrap();
//! assert_eq!(record.get("id"), Some(&Value::Int(7)));
//! assert!(record.get("note").is_none());
//! ```

pub mod caster;
pub mod config;
pub mod environ;
pub mod internal;
pub mod processor;
pub mod schema;
pub mod settings;
pub mod value;

pub use caster::{Caster, CasterRegistry};
pub use config::{Config, ConfigObject};
pub use environ::{cast_environment, EnvironmentSource, ProcessEnvironment};
pub use internal::error::{CasterError, Error, Result};
pub use processor::{cast, cast_schema, cast_with_cache, Container, ContainerFactory, InputData, Output};
pub use schema::{Field, FieldList, ParameterList, Schema, SchemaCache, SchemaParser, SchemaSource};
pub use settings::{MissingValue, Overrides, Policy, Settings, SettingsSource};
pub use value::{Callable, Enumeration, Member, Record, Value, ValueFactory};
