//! [`RecordReader`]: typed, filterable property reads.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use indexmap::IndexMap;
use pathwalk_util::hash::FixedState;

use crate::node::Node;
use crate::record::registry::getters_for;
use crate::record::{
    Getter, IncludeExclude, NoAccessorsError, Record, RecordAccessError, RecordBuilderError,
    RecordType,
};

pub(crate) type ReadFn<T> = Arc<dyn for<'a> Fn(&'a T) -> Option<&'a dyn Node> + Send + Sync>;

/// The conversion hook applied after a read (and before a write on
/// [`RecordWriter`](crate::record::RecordWriter)): `(record, property,
/// value) -> value`.
pub type ValueTransform<T> = Box<dyn Fn(&T, &str, Box<dyn Node>) -> Box<dyn Node> + Send + Sync>;

/// A getter bound to a concrete record type.
pub struct BoundGetter<T> {
    property: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    read: ReadFn<T>,
}

impl<T> BoundGetter<T> {
    /// The name of the property.
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// The `TypeId` of the property's declared type.
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    /// The name of the property's declared type.
    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }
}

impl<T> fmt::Debug for BoundGetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundGetter")
            .field("property", &self.property)
            .field("value_type", &self.value_type_name)
            .finish()
    }
}

type BoundGetterMap<T> = IndexMap<&'static str, BoundGetter<T>, FixedState>;

/// Reads named properties off records of type `T`.
///
/// A reader built through [`RecordReader::new`] covers every property of
/// the type; [`including`](RecordReader::including) and
/// [`excluding`](RecordReader::excluding) narrow the set. Values are
/// returned as owned copies, passed through the optional
/// [`ValueTransform`].
///
/// # Examples
///
/// ```
/// use pathwalk::record::RecordReader;
/// use pathwalk::Record;
///
/// #[derive(Record, Debug, Clone)]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// let person = Person {
///     first_name: "John".to_string(),
///     last_name: "Smith".to_string(),
/// };
///
/// let reader = RecordReader::<Person>::new().unwrap();
/// let value = reader.read(&person, "first_name").unwrap();
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("John"));
/// ```
pub struct RecordReader<T> {
    type_name: &'static str,
    getters: BoundGetterMap<T>,
    transform: Option<ValueTransform<T>>,
}

impl<T: RecordType> RecordReader<T> {
    /// Creates a reader over all properties of `T`.
    pub fn new() -> Result<Self, NoAccessorsError> {
        Self::filtered(IncludeExclude::Include, &[])
    }

    /// Creates a reader over the named properties, in the given order.
    ///
    /// Unknown names are tacitly ignored.
    pub fn including(properties: &[&str]) -> Result<Self, NoAccessorsError> {
        Self::filtered(IncludeExclude::Include, properties)
    }

    /// Creates a reader over all properties except the named ones.
    ///
    /// Unknown names are tacitly ignored.
    pub fn excluding(properties: &[&str]) -> Result<Self, NoAccessorsError> {
        Self::filtered(IncludeExclude::Exclude, properties)
    }

    /// Creates a reader with an explicit include/exclude property list.
    pub fn filtered(
        include_exclude: IncludeExclude,
        properties: &[&str],
    ) -> Result<Self, NoAccessorsError> {
        let descriptor = T::descriptor();
        let all = getters_for(descriptor);
        let mut getters = BoundGetterMap::default();
        if properties.is_empty() {
            for (&name, getter) in all {
                getters.insert(name, bind(getter));
            }
        } else if include_exclude.is_exclude() {
            for (&name, getter) in all {
                if !properties.contains(&name) {
                    getters.insert(name, bind(getter));
                }
            }
        } else {
            // Include order is the caller's order.
            for property in properties {
                if let Some((&name, getter)) = all.get_key_value(*property) {
                    getters.insert(name, bind(getter));
                }
            }
        }
        if getters.is_empty() {
            return Err(NoAccessorsError::readers(descriptor.type_name()));
        }
        Ok(Self {
            type_name: descriptor.type_name(),
            getters,
            transform: None,
        })
    }
}

impl<T: 'static> RecordReader<T> {
    /// Returns a builder assembling a reader from explicit accessor
    /// functions, without the [`Record`] machinery.
    pub fn builder() -> RecordReaderBuilder<T> {
        RecordReaderBuilder::new()
    }

    /// Installs a [`ValueTransform`], applied to every value read.
    pub fn with_transform(
        mut self,
        transform: impl Fn(&T, &str, Box<dyn Node>) -> Box<dyn Node> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Reads a property, returning an owned copy of its value.
    pub fn read(&self, record: &T, property: &str) -> Result<Box<dyn Node>, RecordAccessError> {
        let getter = self
            .getters
            .get(property)
            .ok_or_else(|| RecordAccessError::NoSuchProperty {
                type_name: self.type_name,
                property: property.to_string(),
            })?;
        let value = (getter.read)(record).ok_or_else(|| RecordAccessError::AccessorFailed {
            type_name: self.type_name,
            property: property.to_string(),
        })?;
        let value = value.clone_node();
        Ok(match &self.transform {
            Some(transform) => transform(record, property, value),
            None => value,
        })
    }

    /// Reads all covered properties, in property order.
    pub fn read_all(&self, record: &T) -> Result<Vec<Box<dyn Node>>, RecordAccessError> {
        self.getters
            .keys()
            .map(|property| self.read(record, property))
            .collect()
    }

    /// Returns `true` if this reader covers the property.
    pub fn can_read(&self, property: &str) -> bool {
        self.getters.contains_key(property)
    }

    /// The covered property names, in property order.
    pub fn readable_properties(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.getters.keys().copied()
    }

    /// The bound getters, keyed by property name.
    pub fn getters(&self) -> impl ExactSizeIterator<Item = &BoundGetter<T>> {
        self.getters.values()
    }
}

fn bind<T: RecordType>(getter: &Getter) -> BoundGetter<T> {
    let read = getter.read_fn();
    let bound: ReadFn<T> = Arc::new(move |record| read(record as &dyn Record));
    BoundGetter {
        property: getter.property(),
        value_type: getter.value_type(),
        value_type_name: getter.value_type_name(),
        read: bound,
    }
}

// -----------------------------------------------------------------------------
// Builder

/// Assembles a [`RecordReader`] from explicit accessor functions.
///
/// This is the registration path for types that cannot carry the
/// [`Record`](pathwalk_derive::Record) derive.
///
/// # Examples
///
/// ```
/// use pathwalk::record::RecordReader;
///
/// struct Opaque {
///     id: u32,
/// }
///
/// let reader = RecordReader::<Opaque>::builder()
///     .getter("id", |o: &Opaque| &o.id)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(
///     reader.read(&Opaque { id: 9 }, "id").unwrap().downcast_ref::<u32>(),
///     Some(&9)
/// );
/// ```
pub struct RecordReaderBuilder<T> {
    getters: BoundGetterMap<T>,
    transform: Option<ValueTransform<T>>,
}

impl<T: 'static> RecordReaderBuilder<T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            getters: BoundGetterMap::default(),
            transform: None,
        }
    }

    /// Registers a property with its read accessor.
    pub fn getter<F: Node>(
        mut self,
        property: &'static str,
        read: fn(&T) -> &F,
    ) -> Result<Self, RecordBuilderError> {
        if self.getters.contains_key(property) {
            return Err(RecordBuilderError::DuplicateProperty { property });
        }
        let bound: ReadFn<T> = Arc::new(move |record| Some(read(record) as &dyn Node));
        self.getters.insert(
            property,
            BoundGetter {
                property,
                value_type: TypeId::of::<F>(),
                value_type_name: core::any::type_name::<F>(),
                read: bound,
            },
        );
        Ok(self)
    }

    /// Installs a [`ValueTransform`], applied to every value read.
    pub fn with_transform(
        mut self,
        transform: impl Fn(&T, &str, Box<dyn Node>) -> Box<dyn Node> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Builds the reader. At least one property must be registered.
    pub fn build(self) -> Result<RecordReader<T>, NoAccessorsError> {
        if self.getters.is_empty() {
            return Err(NoAccessorsError::readers(core::any::type_name::<T>()));
        }
        Ok(RecordReader {
            type_name: core::any::type_name::<T>(),
            getters: self.getters,
            transform: self.transform,
        })
    }
}

impl<T: 'static> Default for RecordReaderBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use pathwalk_derive::Record;

    use super::RecordReader;
    use crate::node::Node;
    use crate::record::RecordAccessError;

    #[derive(Record, Debug, Clone, PartialEq)]
    struct Person {
        first_name: String,
        last_name: String,
        hobbies: Vec<String>,
        id: i32,
    }

    fn person() -> Person {
        Person {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            hobbies: vec!["Soccer".to_string(), "Tennis".to_string()],
            id: 42,
        }
    }

    fn as_str(value: &dyn Node) -> Option<&str> {
        value.downcast_ref::<String>().map(String::as_str)
    }

    #[test]
    fn reads_every_property() {
        let p = person();
        let reader = RecordReader::<Person>::new().unwrap();
        assert_eq!(as_str(&*reader.read(&p, "first_name").unwrap()), Some("John"));
        assert_eq!(as_str(&*reader.read(&p, "last_name").unwrap()), Some("Smith"));
        assert_eq!(
            reader.read(&p, "hobbies").unwrap().downcast_ref::<Vec<String>>(),
            Some(&p.hobbies)
        );
        assert_eq!(reader.read(&p, "id").unwrap().downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn include_and_exclude_filter() {
        let reader = RecordReader::<Person>::including(&["last_name", "first_name"]).unwrap();
        // Include order is the caller's order.
        let props: Vec<_> = reader.readable_properties().collect();
        assert_eq!(props, ["last_name", "first_name"]);
        assert!(matches!(
            reader.read(&person(), "id"),
            Err(RecordAccessError::NoSuchProperty { .. })
        ));

        let reader = RecordReader::<Person>::excluding(&["first_name", "last_name"]).unwrap();
        assert!(reader.can_read("id"));
        assert!(!reader.can_read("first_name"));
    }

    #[test]
    fn excluding_everything_is_an_error() {
        assert!(
            RecordReader::<Person>::excluding(&["first_name", "last_name", "hobbies", "id"])
                .is_err()
        );
    }

    #[test]
    fn transform_applies_after_read() {
        let reader = RecordReader::<Person>::new()
            .unwrap()
            .with_transform(|_, _, value| {
                Box::new(alloc::format!("{value:?}"))
            });
        assert_eq!(as_str(&*reader.read(&person(), "id").unwrap()), Some("42"));
    }

    #[test]
    fn read_all_follows_property_order() {
        let reader = RecordReader::<Person>::new().unwrap();
        let values = reader.read_all(&person()).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(as_str(&*values[0]), Some("John"));
        assert_eq!(values[3].downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn builder_registers_explicit_accessors() {
        struct Plain {
            id: u32,
            name: String,
        }
        let reader = RecordReader::<Plain>::builder()
            .getter("id", |p: &Plain| &p.id)
            .unwrap()
            .getter("name", |p: &Plain| &p.name)
            .unwrap()
            .build()
            .unwrap();
        let plain = Plain {
            id: 7,
            name: "x".to_string(),
        };
        assert_eq!(reader.read(&plain, "id").unwrap().downcast_ref::<u32>(), Some(&7));
        assert_eq!(as_str(&*reader.read(&plain, "name").unwrap()), Some("x"));
    }

    #[test]
    fn builder_rejects_duplicates() {
        let builder = RecordReader::<Person>::builder()
            .getter("id", |p: &Person| &p.id)
            .unwrap();
        assert!(builder.getter("id", |p: &Person| &p.id).is_err());
    }
}
