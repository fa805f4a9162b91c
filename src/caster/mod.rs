// Caster module for datacast
//
// A caster turns a raw value into a final value. This module provides:
//
// 1. The `Caster` variant (no-op, single function, chain, type guard)
// 2. Resolution of a value through a caster
// 3. Effective chain construction with pre- and postcasters
// 4. Built-in casters and the string heuristic used for environments
// 5. A name registry used by declarative schema documents

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::internal::error::CasterError;
use crate::value::{Kind, Value};

// Re-export public types and functions
pub use self::heuristic::interpret;
pub use self::registry::CasterRegistry;

// Sub-modules
pub mod builtin;
pub mod heuristic;
pub mod registry;

type CastFnInner = Arc<dyn Fn(Value) -> Result<Value, CasterError> + Send + Sync>;

/// A named unary conversion function.
#[derive(Clone)]
pub struct CastFn {
    name: Arc<str>,
    func: CastFnInner,
}

impl CastFn {
    pub fn new(
        name: &str,
        func: impl Fn(Value) -> Result<Value, CasterError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, value: Value) -> Result<Value, CasterError> {
        (self.func)(value)
    }
}

impl fmt::Debug for CastFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How a raw value becomes a final value.
#[derive(Clone, Debug, Default)]
pub enum Caster {
    /// Accept the value unchanged
    #[default]
    NoOp,
    /// Call a function, constructor or validator
    Single(CastFn),
    /// Left-to-right pipeline; the output of one stage feeds the next
    Chain(Vec<Caster>),
    /// Return values of the given kind unchanged, convert everything else
    TypeGuard(Kind, CastFn),
}

impl Caster {
    /// Wraps a function as a single caster.
    pub fn new(
        name: &str,
        func: impl Fn(Value) -> Result<Value, CasterError> + Send + Sync + 'static,
    ) -> Self {
        Caster::Single(CastFn::new(name, func))
    }

    /// Wraps a conversion that is skipped for values already of `kind`.
    pub fn typed(
        kind: Kind,
        name: &str,
        func: impl Fn(Value) -> Result<Value, CasterError> + Send + Sync + 'static,
    ) -> Self {
        Caster::TypeGuard(kind, CastFn::new(name, func))
    }

    /// Builds a chain from an ordered sequence of casters.
    pub fn chain(casters: impl IntoIterator<Item = Caster>) -> Self {
        Caster::Chain(casters.into_iter().collect())
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Caster::NoOp)
    }

    /// Applies this caster to `value`.
    ///
    /// A failure at any stage of a chain aborts the chain; later stages are
    /// never called.
    pub fn cast(&self, value: Value) -> Result<Value, CasterError> {
        match self {
            Caster::NoOp => Ok(value),
            Caster::TypeGuard(kind, _) if value.kind() == *kind => Ok(value),
            Caster::TypeGuard(_, func) | Caster::Single(func) => func.call(value),
            Caster::Chain(stages) => stages.iter().try_fold(value, |value, stage| stage.cast(value)),
        }
    }

    /// Builds `[*precasters, field, *postcasters]`, or borrows `field` as is
    /// when there are no pre- or postcasters.
    pub fn effective<'a>(
        precasters: &[Caster],
        field: &'a Caster,
        postcasters: &[Caster],
    ) -> Cow<'a, Caster> {
        if precasters.is_empty() && postcasters.is_empty() {
            return Cow::Borrowed(field);
        }
        let mut stages = Vec::with_capacity(precasters.len() + 1 + postcasters.len());
        stages.extend(precasters.iter().cloned());
        stages.push(field.clone());
        stages.extend(postcasters.iter().cloned());
        Cow::Owned(Caster::Chain(stages))
    }
}

impl fmt::Display for Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caster::NoOp => write!(f, "noop"),
            Caster::Single(func) | Caster::TypeGuard(_, func) => write!(f, "{}", func.name()),
            Caster::Chain(stages) => {
                write!(f, "(")?;
                for (i, stage) in stages.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", stage)?;
                }
                write!(f, ")")
            }
        }
    }
}
