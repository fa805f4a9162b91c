use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::value::{Record, Value};

/// Unified error type for the datacast library.
///
/// Every variant aborts the whole cast: no partial output is ever returned
/// alongside an error.
#[derive(Error, Debug)]
pub enum Error {
    /// A field has no input value and no default, and `on_missing` is `raise`.
    #[error("Field is required: {0}")]
    RequiredField(String),

    /// The input holds keys no field consumed, and `on_extra` is `raise`.
    #[error("Data contains extra values: {}", .0.keys().collect::<Vec<_>>().join(", "))]
    ExtraValue(Record),

    /// A caster failed, and `on_invalid` is `raise`.
    #[error("Value cannot be cast: {value} ({source})")]
    Cast {
        value: Value,
        #[source]
        source: CasterError,
    },

    /// The caster description is not a caster, a chain or a no-op.
    /// Never gated by a policy.
    #[error("Not a valid caster: {0}")]
    InvalidCaster(String),

    /// The descriptor is neither field-list-like nor parameter-list-like.
    #[error("Object is not a valid schema: {0}")]
    InvalidSchema(String),

    /// A settings option holds a value it does not accept.
    #[error("Unknown or forbidden option: {option} ({context})")]
    InvalidOption { option: String, context: String },

    /// The input could not be normalized into a key/value view.
    #[error("Input is not a record: {0}")]
    InvalidInput(String),

    /// A cast record could not be turned into a typed config.
    #[error("Cannot materialize config: {0}")]
    Materialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_option(option: impl Into<String>, context: impl Into<String>) -> Self {
        Error::InvalidOption {
            option: option.into(),
            context: context.into(),
        }
    }
}

/// A specialized `Result` type for datacast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised by a single caster.
///
/// Kept apart from [`Error`] so a caster can never masquerade as a schema
/// authoring defect: the processor routes every `CasterError` through the
/// `on_invalid` policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CasterError {
    #[error("invalid integer literal: {0}")]
    InvalidInt(#[from] ParseIntError),

    #[error("invalid float literal: {0}")]
    InvalidFloat(#[from] ParseFloatError),

    #[error("cannot convert {value} to {target}")]
    Unsupported { value: String, target: &'static str },

    #[error("{value} is not a valid {enumeration}")]
    UnknownMember { enumeration: String, value: String },

    #[error("{value} rejected by {check}")]
    Rejected { check: String, value: String },

    #[error("{0}")]
    Custom(String),
}

impl CasterError {
    /// Builds a free-form failure, for user supplied casters.
    pub fn custom(message: impl Into<String>) -> Self {
        CasterError::Custom(message.into())
    }

    pub(crate) fn unsupported(value: &Value, target: &'static str) -> Self {
        CasterError::Unsupported {
            value: value.to_string(),
            target,
        }
    }
}
