// Insertion-ordered key/value record
//
// Records are both the normalized input view and the default result
// container. Entries are kept in a vector, like the item lists of an
// object value, so the external representation is deterministic. A key
// index makes lookups constant time; removal leaves a vacant slot that is
// reclaimed once vacant slots outnumber live entries.

use std::collections::HashMap;
use std::fmt;

use crate::value::types::Value;

/// Vacant slots tolerated before a removal compacts the entry vector.
const COMPACT_THRESHOLD: usize = 32;

/// An insertion-ordered mapping from field names to values.
#[derive(Clone, Default)]
pub struct Record {
    entries: Vec<Option<(String, Value)>>,
    index: HashMap<String, usize>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a value, replacing (in place) any value stored under the same
    /// key. Returns the replaced value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(&i) = self.index.get(&key) {
            if let Some((_, slot)) = self.entries[i].as_mut() {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Some((key, value)));
        None
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let i = *self.index.get(key)?;
        self.entries[i].as_ref().map(|(_, value)| value)
    }

    /// Removes an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.index.remove(key)?;
        let removed = self.entries[i].take().map(|(_, value)| value);
        let vacant = self.entries.len() - self.index.len();
        if vacant > COMPACT_THRESHOLD && vacant > self.index.len() {
            self.compact();
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Merges another record into this one, entry by entry.
    pub fn extend(&mut self, other: Record) {
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    fn compact(&mut self) {
        self.entries.retain(Option::is_some);
        for (i, (key, _)) in self.entries.iter().flatten().enumerate() {
            if let Some(slot) = self.index.get_mut(key.as_str()) {
                *slot = i;
            }
        }
    }
}

/// Equality compares live entries in order.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Option<(String, Value)>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter().flatten()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Builds a [`Record`] from `key => value` pairs.
///
/// ```
/// use datacast::{record, Value};
///
/// let r = record! { "spam" => 1, "ham" => true };
/// assert_eq!(r.get("spam"), Some(&Value::Int(1)));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::value::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::value::Record::new();
        $( record.insert($key, $value); )+
        record
    }};
}
