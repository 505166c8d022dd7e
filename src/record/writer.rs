//! [`RecordWriter`]: typed, filterable property writes and
//! property-by-property propagation.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;

use indexmap::IndexMap;
use pathwalk_util::hash::FixedState;

use crate::node::{Node, ObjectMap, SetValueError};
use crate::record::reader::{ReadFn, ValueTransform};
use crate::record::registry::{getters_for, setters_for};
use crate::record::{
    IncludeExclude, NoAccessorsError, Record, RecordAccessError, RecordBuilderError, RecordType,
};

type WriteFn<T> = Arc<dyn Fn(&mut T, Box<dyn Node>) -> Result<(), SetValueError> + Send + Sync>;

/// A setter bound to a concrete record type, paired with the matching
/// read accessor so that the propagation operations can inspect current
/// values.
pub struct BoundSetter<T> {
    property: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    read: ReadFn<T>,
    write: WriteFn<T>,
}

impl<T> BoundSetter<T> {
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

impl<T> fmt::Debug for BoundSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSetter")
            .field("property", &self.property)
            .field("value_type", &self.value_type_name)
            .finish()
    }
}

type BoundSetterMap<T> = IndexMap<&'static str, BoundSetter<T>, FixedState>;

/// Writes named properties on records of type `T`.
///
/// Beyond single writes, a writer propagates values record-to-record
/// ([`copy`](RecordWriter::copy), [`copy_non_null`](RecordWriter::copy_non_null),
/// [`enrich`](RecordWriter::enrich)) and map-to-record
/// ([`copy_from_map`](RecordWriter::copy_from_map) and friends), always
/// over its own property set.
///
/// # Examples
///
/// ```
/// use pathwalk::record::RecordWriter;
/// use pathwalk::Record;
///
/// #[derive(Record, Debug, Clone, Default)]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// let writer = RecordWriter::<Person>::new().unwrap();
/// let mut person = Person::default();
/// writer.write(&mut person, "first_name", Box::new("John".to_string())).unwrap();
/// assert_eq!(person.first_name, "John");
/// ```
pub struct RecordWriter<T> {
    type_name: &'static str,
    setters: BoundSetterMap<T>,
    transform: Option<ValueTransform<T>>,
}

impl<T: RecordType> RecordWriter<T> {
    /// Creates a writer over all writable properties of `T`.
    pub fn new() -> Result<Self, NoAccessorsError> {
        Self::filtered(IncludeExclude::Include, &[])
    }

    /// Creates a writer over the named properties, in the given order.
    ///
    /// Unknown names are tacitly ignored.
    pub fn including(properties: &[&str]) -> Result<Self, NoAccessorsError> {
        Self::filtered(IncludeExclude::Include, properties)
    }

    /// Creates a writer over all writable properties except the named
    /// ones.
    ///
    /// Unknown names are tacitly ignored.
    pub fn excluding(properties: &[&str]) -> Result<Self, NoAccessorsError> {
        Self::filtered(IncludeExclude::Exclude, properties)
    }

    /// Creates a writer with an explicit include/exclude property list.
    pub fn filtered(
        include_exclude: IncludeExclude,
        properties: &[&str],
    ) -> Result<Self, NoAccessorsError> {
        let descriptor = T::descriptor();
        let all = setters_for(descriptor);
        let getters = getters_for(descriptor);
        let mut setters = BoundSetterMap::default();
        let mut add = |name: &'static str| {
            if let (Some(setter), Some(getter)) = (all.get(name), getters.get(name)) {
                let read = getter.read_fn();
                let write = setter.write_fn();
                let bound_read: ReadFn<T> = Arc::new(move |record| read(record as &dyn Record));
                let bound_write: WriteFn<T> =
                    Arc::new(move |record, value| write(record as &mut dyn Record, value));
                setters.insert(
                    name,
                    BoundSetter {
                        property: setter.property(),
                        value_type: setter.value_type(),
                        value_type_name: setter.value_type_name(),
                        read: bound_read,
                        write: bound_write,
                    },
                );
            }
        };
        if properties.is_empty() {
            for &name in all.keys() {
                add(name);
            }
        } else if include_exclude.is_exclude() {
            for &name in all.keys() {
                if !properties.contains(&name) {
                    add(name);
                }
            }
        } else {
            for property in properties {
                if let Some((&name, _)) = all.get_key_value(*property) {
                    add(name);
                }
            }
        }
        if setters.is_empty() {
            return Err(NoAccessorsError::writers(descriptor.type_name()));
        }
        Ok(Self {
            type_name: descriptor.type_name(),
            setters,
            transform: None,
        })
    }
}

impl<T: 'static> RecordWriter<T> {
    /// Returns a builder assembling a writer from explicit accessor
    /// functions, without the [`Record`] machinery.
    pub fn builder() -> RecordWriterBuilder<T> {
        RecordWriterBuilder::new()
    }

    /// Installs a [`ValueTransform`], applied to every value before it is
    /// written.
    pub fn with_transform(
        mut self,
        transform: impl Fn(&T, &str, Box<dyn Node>) -> Box<dyn Node> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Writes `value` into the named property.
    pub fn write(
        &self,
        record: &mut T,
        property: &str,
        value: Box<dyn Node>,
    ) -> Result<(), RecordAccessError> {
        let setter = self
            .setters
            .get(property)
            .ok_or_else(|| RecordAccessError::NoSuchProperty {
                type_name: self.type_name,
                property: property.to_string(),
            })?;
        self.apply(record, setter, value)
    }

    /// Overwrites every covered property in `to` with its value in
    /// `from`. Null values in `from` overwrite non-null values in `to`.
    pub fn copy(&self, from: &T, to: &mut T) -> Result<(), RecordAccessError> {
        for setter in self.setters.values() {
            let value = self.read_current(from, setter)?.clone_node();
            self.apply(to, setter, value)?;
        }
        Ok(())
    }

    /// Copies every covered property whose value in `from` is non-null.
    ///
    /// Non-null values in `to` may be overwritten, but never nullified.
    pub fn copy_non_null(&self, from: &T, to: &mut T) -> Result<(), RecordAccessError> {
        for setter in self.setters.values() {
            let value = self.read_current(from, setter)?;
            if value.is_null() {
                continue;
            }
            let value = value.clone_node();
            self.apply(to, setter, value)?;
        }
        Ok(())
    }

    /// Copies every covered property whose value in `from` is non-null
    /// and whose value in `to` is null. Non-null properties in `to` are
    /// left alone.
    pub fn enrich(&self, from: &T, to: &mut T) -> Result<(), RecordAccessError> {
        for setter in self.setters.values() {
            let value = self.read_current(from, setter)?;
            if value.is_null() || !self.read_current(to, setter)?.is_null() {
                continue;
            }
            let value = value.clone_node();
            self.apply(to, setter, value)?;
        }
        Ok(())
    }

    /// Overwrites properties in `to` with the same-named entries of
    /// `from`. Entries without a matching property are tacitly ignored.
    pub fn copy_from_map(&self, from: &ObjectMap, to: &mut T) -> Result<(), RecordAccessError> {
        for (key, value) in from.iter() {
            let Some(setter) = key.and_then(|k| self.setters.get(k)) else {
                continue;
            };
            self.apply(to, setter, value.clone_node())?;
        }
        Ok(())
    }

    /// Copies the non-null same-named entries of `from` into `to`.
    pub fn copy_non_null_from_map(
        &self,
        from: &ObjectMap,
        to: &mut T,
    ) -> Result<(), RecordAccessError> {
        for (key, value) in from.iter() {
            let Some(setter) = key.and_then(|k| self.setters.get(k)) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            self.apply(to, setter, value.clone_node())?;
        }
        Ok(())
    }

    /// Copies the non-null same-named entries of `from` into the
    /// properties of `to` that currently hold null.
    pub fn enrich_from_map(&self, from: &ObjectMap, to: &mut T) -> Result<(), RecordAccessError> {
        for (key, value) in from.iter() {
            let Some(setter) = key.and_then(|k| self.setters.get(k)) else {
                continue;
            };
            if value.is_null() || !self.read_current(to, setter)?.is_null() {
                continue;
            }
            self.apply(to, setter, value.clone_node())?;
        }
        Ok(())
    }

    /// Returns `true` if this writer covers the property.
    pub fn can_write(&self, property: &str) -> bool {
        self.setters.contains_key(property)
    }

    /// The covered property names, in property order.
    pub fn writable_properties(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.setters.keys().copied()
    }

    /// The bound setters, keyed by property name.
    pub fn setters(&self) -> impl ExactSizeIterator<Item = &BoundSetter<T>> {
        self.setters.values()
    }

    fn apply(
        &self,
        record: &mut T,
        setter: &BoundSetter<T>,
        value: Box<dyn Node>,
    ) -> Result<(), RecordAccessError> {
        let value = match &self.transform {
            Some(transform) => transform(record, setter.property, value),
            None => value,
        };
        (setter.write)(record, value).map_err(RecordAccessError::TypeMismatch)
    }

    fn read_current<'a>(
        &self,
        record: &'a T,
        setter: &BoundSetter<T>,
    ) -> Result<&'a dyn Node, RecordAccessError> {
        (setter.read)(record).ok_or_else(|| RecordAccessError::AccessorFailed {
            type_name: self.type_name,
            property: setter.property.to_string(),
        })
    }
}

// -----------------------------------------------------------------------------
// Builder

/// Assembles a [`RecordWriter`] from explicit accessor functions.
///
/// Each property registers with both a read and a write accessor; the
/// read side backs the propagation operations.
pub struct RecordWriterBuilder<T> {
    setters: BoundSetterMap<T>,
    transform: Option<ValueTransform<T>>,
}

impl<T: 'static> RecordWriterBuilder<T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            setters: BoundSetterMap::default(),
            transform: None,
        }
    }

    /// Registers a property with its read and write accessors.
    pub fn setter<F: Node>(
        mut self,
        property: &'static str,
        read: fn(&T) -> &F,
        write: fn(&mut T, F),
    ) -> Result<Self, RecordBuilderError> {
        if self.setters.contains_key(property) {
            return Err(RecordBuilderError::DuplicateProperty { property });
        }
        let bound_read: ReadFn<T> = Arc::new(move |record| Some(read(record) as &dyn Node));
        let bound_write: WriteFn<T> = Arc::new(move |record, value: Box<dyn Node>| {
            match value.take::<F>() {
                Ok(value) => {
                    write(record, value);
                    Ok(())
                }
                Err(value) => Err(SetValueError::new(
                    core::any::type_name::<F>(),
                    value.type_name(),
                )),
            }
        });
        self.setters.insert(
            property,
            BoundSetter {
                property,
                value_type: TypeId::of::<F>(),
                value_type_name: core::any::type_name::<F>(),
                read: bound_read,
                write: bound_write,
            },
        );
        Ok(self)
    }

    /// Installs a [`ValueTransform`], applied to every value before it is
    /// written.
    pub fn with_transform(
        mut self,
        transform: impl Fn(&T, &str, Box<dyn Node>) -> Box<dyn Node> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Builds the writer. At least one property must be registered.
    pub fn build(self) -> Result<RecordWriter<T>, NoAccessorsError> {
        if self.setters.is_empty() {
            return Err(NoAccessorsError::writers(core::any::type_name::<T>()));
        }
        Ok(RecordWriter {
            type_name: core::any::type_name::<T>(),
            setters: self.setters,
            transform: self.transform,
        })
    }
}

impl<T: 'static> Default for RecordWriterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests
