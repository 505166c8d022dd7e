//! Bound read and write handles for single record properties.

use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;

use crate::node::{Node, SetValueError};
use crate::record::{PropertyDescriptor, Record};

/// A read handle for a single named property of a record type.
#[derive(Clone, Copy)]
pub struct Getter {
    property: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    read: fn(&dyn Record) -> Option<&dyn Node>,
    read_mut: fn(&mut dyn Record) -> Option<&mut dyn Node>,
}

impl Getter {
    pub(crate) fn from_descriptor(property: &PropertyDescriptor) -> Self {
        Self {
            property: property.name,
            value_type: property.value_type,
            value_type_name: property.value_type_name,
            read: property.get,
            read_mut: property.get_mut,
        }
    }

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

    /// Reads the property off `record`.
    ///
    /// Returns `None` when `record` is not of the type this getter was
    /// created for.
    pub fn read<'a>(&self, record: &'a dyn Record) -> Option<&'a dyn Node> {
        (self.read)(record)
    }

    /// Reads the property off `record`, mutably.
    pub fn read_mut<'a>(&self, record: &'a mut dyn Record) -> Option<&'a mut dyn Node> {
        (self.read_mut)(record)
    }

    pub(crate) fn read_fn(&self) -> fn(&dyn Record) -> Option<&dyn Node> {
        self.read
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getter")
            .field("property", &self.property)
            .field("value_type", &self.value_type_name)
            .finish()
    }
}

/// A write handle for a single named property of a record type.
#[derive(Clone, Copy)]
pub struct Setter {
    property: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    write: fn(&mut dyn Record, Box<dyn Node>) -> Result<(), SetValueError>,
}

impl Setter {
    pub(crate) fn from_descriptor(
        property: &PropertyDescriptor,
        write: fn(&mut dyn Record, Box<dyn Node>) -> Result<(), SetValueError>,
    ) -> Self {
        Self {
            property: property.name,
            value_type: property.value_type,
            value_type_name: property.value_type_name,
            write,
        }
    }

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

    /// Writes `value` into the property on `record`.
    pub fn write(
        &self,
        record: &mut dyn Record,
        value: Box<dyn Node>,
    ) -> Result<(), SetValueError> {
        (self.write)(record, value)
    }

    pub(crate) fn write_fn(
        &self,
    ) -> fn(&mut dyn Record, Box<dyn Node>) -> Result<(), SetValueError> {
        self.write
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("property", &self.property)
            .field("value_type", &self.value_type_name)
            .finish()
    }
}
