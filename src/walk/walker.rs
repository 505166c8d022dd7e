//! [`PathWalker`]: the public read/write entry point.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::node::Node;
use crate::path::Path;
use crate::walk::error::KeyDeserializationError;
use crate::walk::reader::ObjectReader;
use crate::walk::writer::ObjectWriter;
use crate::walk::PathWalkerError;

/// Produces mapping keys from path segments.
///
/// Installed on a [`PathWalker`], the deserializer is consulted at every
/// mapping segment in place of the raw segment string; its output is
/// matched against the mapping's key type.
pub trait KeyDeserializer: Send + Sync {
    /// Produces the key for the mapping segment at `segment` of `path`.
    fn deserialize(
        &self,
        path: &Path,
        segment: usize,
    ) -> Result<Box<dyn Any>, KeyDeserializationError>;
}

impl<F> KeyDeserializer for F
where
    F: Fn(&Path, usize) -> Result<Box<dyn Any>, KeyDeserializationError> + Send + Sync,
{
    fn deserialize(
        &self,
        path: &Path,
        segment: usize,
    ) -> Result<Box<dyn Any>, KeyDeserializationError> {
        self(path, segment)
    }
}

/// Reads and writes values at paths within an object graph.
///
/// A walker owns nothing but policy: whether dead ends surface as errors
/// or as quiet `None`/`false` results, and an optional
/// [`KeyDeserializer`] for mapping keys. The operations themselves are
/// single-shot and stateless.
///
/// # Examples
///
/// ```
/// use pathwalk::{ObjectMap, Path, PathWalker};
///
/// let mut employees = pathwalk::node::ObjectList::new();
/// let mut employee = ObjectMap::new();
/// employee.insert("city", "Amsterdam".to_string());
/// employees.push(employee);
///
/// let mut root = ObjectMap::new();
/// root.insert("employees", employees);
///
/// let walker = PathWalker::new();
/// let path = Path::parse("employees.0.city");
/// let city = walker.read(&root, &path).unwrap().unwrap();
/// assert_eq!(city.downcast_ref::<String>().map(String::as_str), Some("Amsterdam"));
///
/// walker
///     .write(&mut root, &path, Box::new("Rotterdam".to_string()))
///     .unwrap();
/// let city = walker.read(&root, &path).unwrap().unwrap();
/// assert_eq!(city.downcast_ref::<String>().map(String::as_str), Some("Rotterdam"));
/// ```
pub struct PathWalker {
    suppress_errors: bool,
    key_deserializer: Option<Box<dyn KeyDeserializer>>,
}

impl PathWalker {
    /// Creates a walker that surfaces dead ends as
    /// [`PathWalkerError`]s.
    pub fn new() -> Self {
        Self {
            suppress_errors: false,
            key_deserializer: None,
        }
    }

    /// Creates a walker that suppresses dead ends: reads return
    /// `Ok(None)` and writes return `Ok(false)` instead of an error.
    pub fn suppressing() -> Self {
        Self {
            suppress_errors: true,
            key_deserializer: None,
        }
    }

    /// Installs a [`KeyDeserializer`] consulted at mapping segments.
    pub fn with_key_deserializer(mut self, key_deserializer: impl KeyDeserializer + 'static) -> Self {
        self.key_deserializer = Some(Box::new(key_deserializer));
        self
    }

    /// Returns `true` if this walker suppresses dead ends.
    pub fn suppresses_errors(&self) -> bool {
        self.suppress_errors
    }

    /// Reads the value at `path` under `root`.
    ///
    /// An empty path returns the root itself. `Ok(None)` is only produced
    /// in suppress mode; with suppression off every dead end is an `Err`.
    pub fn read<'a>(
        &self,
        root: &'a dyn Node,
        path: &Path,
    ) -> Result<Option<&'a dyn Node>, PathWalkerError> {
        let reader = ObjectReader::new(self.key_deserializer.as_deref());
        match reader.read(root, path) {
            Ok(value) => Ok(Some(value.resolve())),
            Err(dead_end) => {
                if self.suppress_errors {
                    Ok(None)
                } else {
                    Err(dead_end.into_error(path))
                }
            }
        }
    }

    /// Reads the value at `path` and downcasts it.
    ///
    /// Returns `Ok(None)` when the traversal dead-ends in suppress mode
    /// or when the value is not a `T`.
    pub fn read_as<'a, T: Node>(
        &self,
        root: &'a dyn Node,
        path: &Path,
    ) -> Result<Option<&'a T>, PathWalkerError> {
        Ok(self.read(root, path)?.and_then(|v| v.downcast_ref::<T>()))
    }

    /// Writes `value` at `path` under `root`, returning `true` on
    /// success.
    ///
    /// All segments but the last are traversed with read semantics; the
    /// last is dispatched to the segment writer of the parent's category.
    /// `Ok(false)` is only produced in suppress mode.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty: there is no location to write to.
    pub fn write(
        &self,
        root: &mut dyn Node,
        path: &Path,
        value: Box<dyn Node>,
    ) -> Result<bool, PathWalkerError> {
        let writer = ObjectWriter::new(self.key_deserializer.as_deref());
        match writer.write(root, path, value) {
            Ok(()) => Ok(true),
            Err(dead_end) => {
                if self.suppress_errors {
                    Ok(false)
                } else {
                    Err(dead_end.into_error(path))
                }
            }
        }
    }
}

impl Default for PathWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PathWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathWalker")
            .field("suppress_errors", &self.suppress_errors)
            .field("key_deserializer", &self.key_deserializer.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use core::any::Any;

    use pathwalk_derive::Record;

    use super::PathWalker;
    use crate::node::{Node, Null, ObjectList, ObjectMap};
    use crate::path::Path;
    use crate::walk::{ErrorCode, KeyDeserializationError};

    fn walker() -> PathWalker {
        PathWalker::new()
    }

    /// `{foo: {bar: {bozo: <value>}}}`
    fn nested(value: impl Node) -> ObjectMap {
        let mut bar = ObjectMap::new();
        bar.insert("bozo", value);
        let mut foo = ObjectMap::new();
        foo.insert("bar", bar);
        let mut root = ObjectMap::new();
        root.insert("foo", foo);
        root
    }

    fn words() -> ObjectList {
        let mut list = ObjectList::new();
        for w in ["to", "be", "or", "not", "to", "be"] {
            list.push(w.to_string());
        }
        list
    }

    fn read_str<'a>(root: &'a dyn Node, path: &str) -> Option<&'a str> {
        walker()
            .read_as::<String>(root, &Path::parse(path))
            .unwrap()
            .map(String::as_str)
    }

    #[test]
    fn write_into_sequence() {
        let mut root = nested(words());
        let path = Path::parse("foo.bar.bozo.2");
        assert!(walker().write(&mut root, &path, Box::new("nor".to_string())).unwrap());

        let joined: alloc::vec::Vec<&str> = (0..6)
            .map(|i| read_str(&root, &alloc::format!("foo.bar.bozo.{i}")).unwrap())
            .collect();
        assert_eq!(joined.join(" "), "to be nor not to be");
    }

    #[test]
    fn write_into_reference_array() {
        let mut root = nested(["to".to_string(), "be".to_string(), "or".to_string()]);
        let path = Path::parse("foo.bar.bozo.2");
        assert!(walker().write(&mut root, &path, Box::new("nor".to_string())).unwrap());
        assert_eq!(read_str(&root, "foo.bar.bozo.2"), Some("nor"));
    }

    #[test]
    fn write_into_primitive_array() {
        let mut root = nested([0_i32, 1, 2, 3, 4, 5]);
        let path = Path::parse("foo.bar.bozo.2");
        assert!(walker().write(&mut root, &path, Box::new(42_i32)).unwrap());
        let array = walker()
            .read_as::<[i32; 6]>(&root, &Path::parse("foo.bar.bozo"))
            .unwrap()
            .unwrap();
        assert_eq!(*array, [0, 1, 42, 3, 4, 5]);
    }

    #[test]
    fn write_past_null_is_a_terminal_value() {
        let mut root = nested(Null);
        let err = walker()
            .write(&mut root, &Path::parse("foo.bar.bozo.teapot"), Box::new(42_i32))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TerminalValue);
        assert_eq!(err.segment(), 3);
    }

    #[test]
    fn write_past_leaf_is_a_terminal_value() {
        let mut root = nested(42_i32);
        let path = Path::parse("foo.bar.bozo.teapot");
        assert!(!PathWalker::suppressing()
            .write(&mut root, &path, Box::new("one step too far".to_string()))
            .unwrap());
        let err = walker()
            .write(&mut root, &path, Box::new("one step too far".to_string()))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TerminalValue);
    }

    #[test]
    fn write_against_null_root() {
        let mut root = Null;
        let path = Path::parse("foo");
        assert!(!PathWalker::suppressing()
            .write(&mut root, &path, Box::new(7_i32))
            .unwrap());
        let err = walker().write(&mut root, &path, Box::new(7_i32)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TerminalValue);
    }

    #[test]
    fn null_mid_path_dead_ends_reads() {
        let root = nested(Null);
        // Reading up to the null returns the null node itself.
        let value = walker().read(&root, &Path::parse("foo.bar.bozo")).unwrap();
        assert!(value.unwrap().is_null());
        // Reading past it is a dead end.
        let err = walker()
            .read(&root, &Path::parse("foo.bar.bozo.deeper"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NullValue);
        assert_eq!(err.segment(), 3);
        assert!(PathWalker::suppressing()
            .read(&root, &Path::parse("foo.bar.bozo.deeper"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_key_and_bad_indices() {
        let root = nested(words());
        let err = walker().read(&root, &Path::parse("foo.nope")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSuchKey);

        let err = walker()
            .read(&root, &Path::parse("foo.bar.bozo.teapot"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexExpected);

        let err = walker()
            .read(&root, &Path::parse("foo.bar.bozo.17"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexOutOfBounds);

        // A negative index is not an index at all.
        let err = walker()
            .read(&root, &Path::parse("foo.bar.bozo.-1"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexExpected);
    }

    #[test]
    fn empty_path_reads_the_root() {
        let root = nested(1_i32);
        let value = walker().read(&root, &Path::empty()).unwrap().unwrap();
        assert!(value.is::<ObjectMap>());
    }

    #[test]
    fn prefix_reads_succeed_for_successful_reads() {
        let root = nested(words());
        let path = Path::parse("foo.bar.bozo.4");
        assert!(walker().read(&root, &path).is_ok());
        for len in 0..path.len() {
            let prefix = path.sub_path_len(0, len);
            assert!(walker().read(&root, &prefix).unwrap().is_some());
        }
    }

    #[test]
    fn null_key_segment_reads_null_keyed_entries() {
        let mut lookups = ObjectMap::new();
        lookups.insert_null_key("the null entry".to_string());
        let mut root = ObjectMap::new();
        root.insert("lookups", lookups);

        assert_eq!(read_str(&root, "lookups.^0"), Some("the null entry"));
    }

    #[test]
    fn typed_maps_participate() {
        let mut inner: std::collections::HashMap<String, i32> = std::collections::HashMap::new();
        inner.insert("count".to_string(), 3);
        let mut root = ObjectMap::new();
        root.insert("inner", inner);

        assert_eq!(
            walker()
                .read_as::<i32>(&root, &Path::parse("inner.count"))
                .unwrap(),
            Some(&3)
        );

        // Typed map writes enforce the value type.
        let err = walker()
            .write(
                &mut root,
                &Path::parse("inner.count"),
                Box::new("three".to_string()),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
        assert!(walker()
            .write(&mut root, &Path::parse("inner.count"), Box::new(4_i32))
            .unwrap());
    }

    #[test]
    fn write_then_read_round_trip() {
        let mut root = nested(words());
        let path = Path::parse("foo.bar.extra");
        assert!(walker().write(&mut root, &path, Box::new(7_i32)).unwrap());
        assert_eq!(walker().read_as::<i32>(&root, &path).unwrap(), Some(&7));
    }

    #[test]
    fn reference_array_type_check_precedes_index_parse() {
        let mut root = nested(["a".to_string(), "b".to_string()]);
        // Wrong component type with a non-index segment: the type wins.
        let err = walker()
            .write(&mut root, &Path::parse("foo.bar.bozo.teapot"), Box::new(1_i32))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn key_deserializer_feeds_typed_maps() {
        let mut scores: std::collections::HashMap<String, i32> = std::collections::HashMap::new();
        scores.insert("ALICE".to_string(), 10);
        let mut root = ObjectMap::new();
        root.insert("SCORES", scores);

        // Upper-cases every mapping key.
        let walker = PathWalker::new().with_key_deserializer(
            |path: &Path, segment: usize| -> Result<Box<dyn Any>, KeyDeserializationError> {
                match path.segment(segment as isize) {
                    Some(s) => Ok(Box::new(s.to_uppercase())),
                    None => Err(KeyDeserializationError::new("null key")),
                }
            },
        );
        assert_eq!(
            walker
                .read_as::<i32>(&root, &Path::parse("SCORES.alice"))
                .unwrap(),
            Some(&10)
        );

        let err = walker
            .read(&root, &Path::parse("scores.^0"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::KeyDeserializationFailed);
    }

    #[test]
    fn records_participate_in_traversal() {
        #[derive(Record, Debug, Clone)]
        struct Address {
            city: String,
        }

        #[derive(Record, Debug, Clone)]
        struct Employee {
            address: Address,
            #[record(readonly)]
            id: i32,
        }

        let mut root = ObjectMap::new();
        root.insert(
            "employee",
            Employee {
                address: Address {
                    city: "Amsterdam".to_string(),
                },
                id: 1,
            },
        );

        assert_eq!(read_str(&root, "employee.address.city"), Some("Amsterdam"));

        let path = Path::parse("employee.address.city");
        assert!(walker()
            .write(&mut root, &path, Box::new("Rotterdam".to_string()))
            .unwrap());
        assert_eq!(read_str(&root, "employee.address.city"), Some("Rotterdam"));

        let err = walker()
            .read(&root, &Path::parse("employee.address.street"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSuchProperty);

        let err = walker()
            .read(&root, &Path::parse("employee.address."))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptySegment);

        // Read-only properties reject writes.
        let err = walker()
            .write(&mut root, &Path::parse("employee.id"), Box::new(2_i32))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSuchProperty);

        // Descending into a leaf property is a terminal value.
        let err = walker()
            .read(&root, &Path::parse("employee.id.deeper"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TerminalValue);
    }

    #[test]
    fn option_properties_resolve_transparently() {
        #[derive(Record, Debug, Clone)]
        struct Person {
            nickname: Option<String>,
        }

        let mut root = ObjectMap::new();
        root.insert(
            "person",
            Person {
                nickname: Some("Ada".to_string()),
            },
        );

        assert_eq!(read_str(&root, "person.nickname"), Some("Ada"));

        // Null clears the option through a write.
        assert!(walker()
            .write(&mut root, &Path::parse("person.nickname"), Box::new(Null))
            .unwrap());
        let value = walker()
            .read(&root, &Path::parse("person.nickname"))
            .unwrap()
            .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn property_less_records_are_terminal() {
        #[derive(Record, Debug, Clone)]
        struct Empty {}

        let mut root = ObjectMap::new();
        root.insert("empty", Empty {});
        let err = walker().read(&root, &Path::parse("empty.x")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TerminalValue);
    }

    #[test]
    #[should_panic(expected = "empty path")]
    fn write_to_the_empty_path_panics() {
        let mut root = ObjectMap::new();
        let _ = walker().write(&mut root, &Path::empty(), Box::new(1_i32));
    }

    #[test]
    fn error_display_carries_code_path_and_segment() {
        let root = nested(Null);
        let err = walker()
            .read(&root, &Path::parse("foo.bar.bozo.deeper"))
            .unwrap_err();
        let rendered = alloc::format!("{err}");
        assert!(rendered.contains("NULL_VALUE"));
        assert!(rendered.contains("foo.bar.bozo.deeper"));
        assert!(rendered.contains("segment 3"));
    }
}
