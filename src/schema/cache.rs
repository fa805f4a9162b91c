// Schema cache
//
// Extracting a schema walks the descriptor and resolves its embedded
// settings, so the result is memoized per descriptor identity. The cache is
// an explicit object; `SchemaCache::global` is the process-wide instance
// used by the convenience entry points.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::internal::error::Result;
use crate::schema::source::{DescriptorKey, SchemaSource};
use crate::schema::types::Schema;

static GLOBAL: Lazy<SchemaCache> = Lazy::new(SchemaCache::new);

/// Concurrent memo of extracted schemas, keyed by descriptor identity.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: DashMap<DescriptorKey, Arc<Schema>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide cache.
    pub fn global() -> &'static SchemaCache {
        &GLOBAL
    }

    /// Returns the cached schema of `source`, extracting it on first use.
    ///
    /// No lock is held while extracting, so a descriptor may consult this
    /// cache from its own `declarations`. Racing callers may each extract;
    /// the first stored schema is returned to all of them. A failed
    /// extraction is not cached.
    pub fn get_or_extract(&self, source: &dyn SchemaSource) -> Result<Arc<Schema>> {
        let key = source.key();
        if let Some(schema) = self.get(&key) {
            trace!(schema = source.name(), "schema cache hit");
            return Ok(schema);
        }

        let schema = Arc::new(Schema::from_source(source)?);
        let stored = self.entries.entry(key).or_insert(schema).value().clone();
        Ok(stored)
    }

    pub fn get(&self, key: &DescriptorKey) -> Option<Arc<Schema>> {
        self.entries.get(key).map(|schema| schema.value().clone())
    }

    pub fn contains(&self, source: &dyn SchemaSource) -> bool {
        self.entries.contains_key(&source.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
