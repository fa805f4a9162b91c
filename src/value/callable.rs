// Zero-argument producers
//
// A `Callable` is an ordinary value that happens to be invokable: whether it
// is invoked or stored depends on `store_callables`. A `ValueFactory` is
// always invoked when used as a missing value.

use std::fmt;
use std::sync::Arc;

use crate::value::types::Value;

type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// A callable stored as a value. Equality is identity.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    func: Producer,
}

impl Callable {
    pub fn new(name: &str, func: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self) -> Value {
        (self.func)()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.name).finish()
    }
}

/// Generates a value at resolution time.
///
/// Unlike a [`Callable`], a factory is never stored: it is invoked every time
/// a missing value is synthesized.
#[derive(Clone)]
pub struct ValueFactory {
    func: Producer,
}

impl ValueFactory {
    pub fn new(func: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self {
            func: Arc::new(func),
        }
    }

    pub fn produce(&self) -> Value {
        (self.func)()
    }
}

impl PartialEq for ValueFactory {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueFactory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callable_identity() {
        let a = Callable::new("zero", || Value::Int(0));
        let b = Callable::new("zero", || Value::Int(0));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.call(), Value::Int(0));
    }

    #[test]
    fn test_factory_produces_fresh_values() {
        let factory = ValueFactory::new(|| Value::List(Vec::new()));
        assert_eq!(factory.produce(), Value::List(Vec::new()));
    }
}
