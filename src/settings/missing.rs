// Missing-value synthesis

use crate::value::{Value, ValueFactory};

/// The value stored for a missing field under the `store` policy.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingValue {
    /// A fixed value. A callable is invoked unless callables are stored.
    Value(Value),
    /// A factory producing a fresh value for every missing field
    Factory(ValueFactory),
}

impl Default for MissingValue {
    fn default() -> Self {
        MissingValue::Value(Value::Null)
    }
}

impl MissingValue {
    /// Produces the value to store for one missing field.
    pub fn resolve(&self, store_callables: bool) -> Value {
        match self {
            MissingValue::Factory(factory) => factory.produce(),
            MissingValue::Value(Value::Callable(callable)) if !store_callables => callable.call(),
            MissingValue::Value(value) => value.clone(),
        }
    }
}

impl From<Value> for MissingValue {
    fn from(value: Value) -> Self {
        MissingValue::Value(value)
    }
}

impl From<ValueFactory> for MissingValue {
    fn from(factory: ValueFactory) -> Self {
        MissingValue::Factory(factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Callable;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callable_invoked_unless_stored() {
        let callable = Callable::new("answer", || Value::Int(42));
        let missing = MissingValue::Value(Value::Callable(callable.clone()));
        assert_eq!(missing.resolve(false), Value::Int(42));
        assert_eq!(missing.resolve(true), Value::Callable(callable));
    }

    #[test]
    fn test_factory_produces_fresh_values() {
        let counter = Arc::new(AtomicI64::new(0));
        let next = counter.clone();
        let missing = MissingValue::from(ValueFactory::new(move || {
            Value::Int(next.fetch_add(1, Ordering::SeqCst))
        }));
        assert_eq!(missing.resolve(false), Value::Int(0));
        assert_eq!(missing.resolve(true), Value::Int(1));
    }
}
