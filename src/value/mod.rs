// Value module for datacast
//
// This module provides the dynamic value model every cast operates on:
//
// 1. `Value` and its exact-type tag `Kind`
// 2. `Record`, the insertion-ordered key/value container
// 3. Enumerations and their members
// 4. Callables and value factories
// 5. Mapping rules between JSON and `Value`

// Re-export public types
pub use self::callable::{Callable, ValueFactory};
pub use self::enumeration::{Enumeration, Member};
pub use self::record::Record;
pub use self::types::{Kind, Value};

// Sub-modules
pub mod callable;
pub mod enumeration;
pub mod mapper;
pub mod record;
pub mod types;
