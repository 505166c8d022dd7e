//! The mapping category: keyed collections.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::hash::Hash;

use crate::node::{Node, SetValueError};

// -----------------------------------------------------------------------------
// Keys

/// The key supplied to a mapping lookup or store.
///
/// Without a key deserializer the traversal engine hands the raw path
/// segment to the map (`Segment`); with one, the deserialized key
/// (`Custom`).
pub enum LookupKey<'a> {
    /// The raw path segment; `None` is the null key.
    Segment(Option<&'a str>),
    /// A key produced by a [`KeyDeserializer`](crate::walk::KeyDeserializer).
    Custom(&'a dyn Any),
}

impl LookupKey<'_> {
    /// Describes the key for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            LookupKey::Segment(Some(s)) => alloc::format!("\"{s}\""),
            LookupKey::Segment(None) => "null".to_string(),
            LookupKey::Custom(_) => "deserialized key".to_string(),
        }
    }
}

/// A key type a typed mapping can be traversed by.
///
/// Implementations exist for `String` (plain segment keys) and
/// `Option<String>` (segment keys including the null key).
pub trait MapKey: Any + Clone + Eq + Hash + Send + Sync + fmt::Debug {
    /// Converts a raw path segment into this key type, if representable.
    fn from_segment(segment: Option<&str>) -> Option<Self>;

    /// Renders this key back as a path segment, if representable.
    fn as_segment(&self) -> Option<Option<&str>>;
}

impl MapKey for String {
    fn from_segment(segment: Option<&str>) -> Option<Self> {
        segment.map(str::to_owned)
    }

    fn as_segment(&self) -> Option<Option<&str>> {
        Some(Some(self))
    }
}

impl MapKey for Option<String> {
    fn from_segment(segment: Option<&str>) -> Option<Self> {
        Some(segment.map(str::to_owned))
    }

    fn as_segment(&self) -> Option<Option<&str>> {
        Some(self.as_deref())
    }
}

/// Resolves a [`LookupKey`] to a concrete key type.
///
/// A custom key resolves by downcast; a raw segment through
/// [`MapKey::from_segment`]. `None` means the mapping cannot contain the
/// key at all.
pub(crate) fn resolve_key<K: MapKey>(key: &LookupKey<'_>) -> Option<K> {
    match key {
        LookupKey::Segment(segment) => K::from_segment(*segment),
        LookupKey::Custom(any) => any.downcast_ref::<K>().cloned(),
    }
}

// -----------------------------------------------------------------------------
// MapNode

/// A failed store into a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapWriteError {
    /// The mapping rejects modification.
    NotModifiable,
    /// The mapping's key type cannot represent the supplied key.
    KeyMismatch { map_type: &'static str },
    /// The value is not assignable to the mapping's value type.
    ValueMismatch(SetValueError),
}

impl fmt::Display for MapWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapWriteError::NotModifiable => f.write_str("mapping is not modifiable"),
            MapWriteError::KeyMismatch { map_type } => {
                write!(f, "key not representable by {map_type}")
            }
            MapWriteError::ValueMismatch(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for MapWriteError {}

/// The mapping category: a keyed collection.
///
/// A lookup returning `None` means the key is *absent*; a key that is
/// present with a null value returns the stored null node. The two cases
/// are therefore distinguished by a single probe.
pub trait MapNode {
    /// Looks up the value stored under `key`.
    fn get_entry<'a>(&'a self, key: &LookupKey<'_>) -> Option<&'a dyn Node>;

    /// Looks up the value stored under `key`, mutably.
    fn get_entry_mut<'a>(&'a mut self, key: &LookupKey<'_>) -> Option<&'a mut dyn Node>;

    /// Stores `value` under `key`.
    fn put_entry(&mut self, key: &LookupKey<'_>, value: Box<dyn Node>)
        -> Result<(), MapWriteError>;

    /// Returns the number of entries.
    fn entry_count(&self) -> usize;

    /// Returns all entries with their keys rendered as path segments, or
    /// `None` if the key type has no segment form.
    fn string_entries(&self) -> Option<Vec<(Option<&str>, &dyn Node)>>;
}
