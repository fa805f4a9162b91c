// Result materialization
//
// The processor fills a container produced by the configured factory. The
// default container is a `Record`; any type implementing `Container` can be
// used instead and recovered from the `Output` by downcasting.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::value::{Record, Value};

/// A mutable key/value output container.
pub trait Container: Any + Send + fmt::Debug {
    /// Stores a field, in processing order.
    fn insert(&mut self, key: String, value: Value);

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl Container for Record {
    fn insert(&mut self, key: String, value: Value) {
        Record::insert(self, key, value);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

type Builder = Arc<dyn Fn() -> Box<dyn Container> + Send + Sync>;

/// Creates empty output containers.
#[derive(Clone)]
pub struct ContainerFactory {
    name: Arc<str>,
    build: Builder,
}

impl ContainerFactory {
    pub fn new(name: &str, build: impl Fn() -> Box<dyn Container> + Send + Sync + 'static) -> Self {
        Self {
            name: Arc::from(name),
            build: Arc::new(build),
        }
    }

    /// Factory for any default-constructible container type.
    pub fn of<C: Container + Default>() -> Self {
        Self::new(std::any::type_name::<C>(), || Box::new(C::default()))
    }

    /// The default factory, producing a [`Record`].
    pub fn record() -> Self {
        Self::new("record", || Box::new(Record::new()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create(&self) -> Box<dyn Container> {
        (self.build)()
    }
}

impl Default for ContainerFactory {
    fn default() -> Self {
        Self::record()
    }
}

impl fmt::Debug for ContainerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContainerFactory").field(&self.name).finish()
    }
}

/// The materialized result of a cast.
#[derive(Debug)]
pub struct Output {
    container: Box<dyn Container>,
}

impl Output {
    pub(crate) fn new(container: Box<dyn Container>) -> Self {
        Self { container }
    }

    /// Borrows the container as `C`, if that is what the factory built.
    pub fn downcast_ref<C: Container>(&self) -> Option<&C> {
        self.container.as_any().downcast_ref::<C>()
    }

    /// Takes the container as `C`, if that is what the factory built.
    pub fn downcast<C: Container>(self) -> Option<C> {
        self.container.into_any().downcast::<C>().ok().map(|c| *c)
    }

    /// Takes the default record container.
    pub fn into_record(self) -> Option<Record> {
        self.downcast::<Record>()
    }

    pub fn as_record(&self) -> Option<&Record> {
        self.downcast_ref::<Record>()
    }
}
