//! [`ObjectMap`]: the insertion-ordered, heterogeneous mapping.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use indexmap::IndexMap;
use pathwalk_util::hash::FixedState;

use crate::node::{
    impl_node_common, LookupKey, MapNode, MapWriteError, Node, NodeMut, NodeRef, Null,
};

type Entries = IndexMap<Option<String>, Box<dyn Node>, FixedState>;

/// An insertion-ordered mapping from keys to arbitrary node values.
///
/// `ObjectMap` is the container heterogeneous object graphs are made of:
/// keys are strings (or the null key), values are any boxed [`Node`].
/// Iteration order is insertion order.
///
/// # Examples
///
/// ```
/// use pathwalk::{ObjectMap, PathWalker, Path};
///
/// let mut address = ObjectMap::new();
/// address.insert("city", "Amsterdam".to_string());
///
/// let mut employee = ObjectMap::new();
/// employee.insert("address", address);
///
/// let walker = PathWalker::new();
/// let city = walker.read(&employee, &Path::parse("address.city")).unwrap();
/// assert_eq!(city.unwrap().downcast_ref::<String>().map(String::as_str), Some("Amsterdam"));
/// ```
#[derive(Default)]
pub struct ObjectMap {
    entries: Entries,
}

/// Segment-form probe key, hash-compatible with `Option<String>`.
#[derive(Hash)]
struct SegKey<'a>(Option<&'a str>);

impl indexmap::Equivalent<Option<String>> for SegKey<'_> {
    fn equivalent(&self, key: &Option<String>) -> bool {
        self.0 == key.as_deref()
    }
}

impl ObjectMap {
    /// Creates an empty `ObjectMap`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `ObjectMap` with at least the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Entries::with_capacity_and_hasher(capacity, FixedState::default()),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a value under a string key, returning a previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Node) -> Option<Box<dyn Node>> {
        self.entries.insert(Some(key.into()), Box::new(value))
    }

    /// Inserts an already-boxed value; a `None` key is the null key.
    pub fn insert_boxed(
        &mut self,
        key: Option<String>,
        value: Box<dyn Node>,
    ) -> Option<Box<dyn Node>> {
        self.entries.insert(key, value)
    }

    /// Inserts a value under the null key.
    pub fn insert_null_key(&mut self, value: impl Node) -> Option<Box<dyn Node>> {
        self.entries.insert(None, Box::new(value))
    }

    /// Inserts a null value under a string key.
    pub fn insert_null(&mut self, key: impl Into<String>) -> Option<Box<dyn Node>> {
        self.insert(key, Null)
    }

    /// Returns the value under a string key.
    pub fn get(&self, key: &str) -> Option<&dyn Node> {
        self.entries.get(&SegKey(Some(key))).map(|v| &**v)
    }

    /// Returns the value under the null key.
    pub fn get_null_key(&self) -> Option<&dyn Node> {
        self.entries.get(&SegKey(None)).map(|v| &**v)
    }

    /// Returns the value under a string key, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut dyn Node> {
        self.entries.get_mut(&SegKey(Some(key))).map(|v| &mut **v)
    }

    /// Returns `true` if the map contains the string key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&SegKey(Some(key)))
    }

    /// Removes the value under a string key, preserving the order of the
    /// remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Node>> {
        self.entries.shift_remove(&SegKey(Some(key)))
    }

    /// Iterates over the entries in insertion order; a `None` key is the
    /// null key.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Option<&str>, &dyn Node)> {
        self.entries.iter().map(|(k, v)| (k.as_deref(), &**v))
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = Option<&str>> {
        self.entries.keys().map(|k| k.as_deref())
    }
}

impl Clone for ObjectMap {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone_node()))
                .collect(),
        }
    }
}

impl fmt::Debug for ObjectMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct KeyRepr<'a>(Option<&'a str>);

        impl fmt::Debug for KeyRepr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    Some(s) => fmt::Debug::fmt(s, f),
                    None => f.write_str("null"),
                }
            }
        }

        f.debug_map()
            .entries(self.iter().map(|(k, v)| (KeyRepr(k), v)))
            .finish()
    }
}

impl Node for ObjectMap {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }
}

impl MapNode for ObjectMap {
    fn get_entry<'a>(&'a self, key: &LookupKey<'_>) -> Option<&'a dyn Node> {
        match key {
            LookupKey::Segment(segment) => self.entries.get(&SegKey(*segment)).map(|v| &**v),
            LookupKey::Custom(any) => self.entries.get(&custom_key(any)?).map(|v| &**v),
        }
    }

    fn get_entry_mut<'a>(&'a mut self, key: &LookupKey<'_>) -> Option<&'a mut dyn Node> {
        match key {
            LookupKey::Segment(segment) => {
                self.entries.get_mut(&SegKey(*segment)).map(|v| &mut **v)
            }
            LookupKey::Custom(any) => self.entries.get_mut(&custom_key(any)?).map(|v| &mut **v),
        }
    }

    fn put_entry(
        &mut self,
        key: &LookupKey<'_>,
        value: Box<dyn Node>,
    ) -> Result<(), MapWriteError> {
        let key = match key {
            LookupKey::Segment(segment) => segment.map(str::to_owned),
            LookupKey::Custom(any) => match custom_key(any) {
                Some(key) => key,
                None => {
                    return Err(MapWriteError::KeyMismatch {
                        map_type: core::any::type_name::<Self>(),
                    })
                }
            },
        };
        self.entries.insert(key, value);
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn string_entries(&self) -> Option<Vec<(Option<&str>, &dyn Node)>> {
        Some(self.iter().collect())
    }
}

/// Interprets a deserialized key as `String` or `Option<String>`.
fn custom_key(any: &&dyn Any) -> Option<Option<String>> {
    if let Some(s) = any.downcast_ref::<String>() {
        Some(Some(s.clone()))
    } else {
        any.downcast_ref::<Option<String>>().cloned()
    }
}

// -----------------------------------------------------------------------------
// Tests
