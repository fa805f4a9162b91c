// Schema module for datacast
//
// This module turns descriptors into schemas. It includes:
//
// 1. Fields and schemas
// 2. The `SchemaSource` trait with field-list and parameter-list descriptors
// 3. A parser for declarative JSON schema documents
// 4. A concurrent schema cache keyed by descriptor identity

// Re-export public types
pub use self::cache::SchemaCache;
pub use self::parser::SchemaParser;
pub use self::source::{DescriptorKey, FieldList, Parameter, ParameterList, SchemaSource};
pub use self::types::{Field, Schema};

// Sub-modules
pub mod cache;
pub mod parser;
pub mod source;
pub mod types;
