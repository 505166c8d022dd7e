//! The record layer: named-property access to struct-like values.
//!
//! A *record* is any value exposing named properties. The
//! [`Record`](pathwalk_derive::Record) derive generates the required
//! wiring from a struct's fields; the
//! [`RecordReaderBuilder`]/[`RecordWriterBuilder`] types cover types that
//! cannot carry the derive.
//!
//! Property access runs through two process-wide caches mapping a record
//! type to its insertion-ordered accessor map; a type is introspected once
//! and the resulting map is shared for the lifetime of the process.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::node::{Node, SetValueError};

mod accessor;
mod reader;
mod registry;
mod writer;

pub use accessor::{Getter, Setter};
pub use reader::{BoundGetter, RecordReader, RecordReaderBuilder, ValueTransform};
pub use registry::{getters_for, getters_of, setters_for, setters_of, GetterMap, SetterMap};
pub use writer::{BoundSetter, RecordWriter, RecordWriterBuilder};

// -----------------------------------------------------------------------------
// Record

/// A node exposing named properties.
///
/// Implemented by the [`Record`](pathwalk_derive::Record) derive; the
/// traversal engine reaches properties through the descriptor this trait
/// hands out.
pub trait Record: Node {
    /// Returns the property descriptor of this record's type.
    fn record_descriptor(&self) -> &'static RecordDescriptor;
}

/// Instance-free access to a record type's descriptor.
pub trait RecordType: Record + Sized {
    /// Returns the property descriptor of this type.
    fn descriptor() -> &'static RecordDescriptor;
}

// -----------------------------------------------------------------------------
// Descriptors

/// Describes one named property of a record type.
///
/// The accessor functions take the record as `dyn Record` and downcast
/// internally; they return `None` when handed a foreign record type.
pub struct PropertyDescriptor {
    /// The property name.
    pub name: &'static str,
    /// The `TypeId` of the property's declared type.
    pub value_type: TypeId,
    /// The name of the property's declared type.
    pub value_type_name: &'static str,
    /// Reads the property.
    pub get: fn(&dyn Record) -> Option<&dyn Node>,
    /// Reads the property, mutably.
    pub get_mut: fn(&mut dyn Record) -> Option<&mut dyn Node>,
    /// Writes the property; `None` for read-only properties.
    pub set: Option<fn(&mut dyn Record, Box<dyn Node>) -> Result<(), SetValueError>>,
}

/// Describes a record type: its name and its properties, in declaration
/// order.
pub struct RecordDescriptor {
    type_name: &'static str,
    type_id: TypeId,
    properties: Vec<PropertyDescriptor>,
}

impl RecordDescriptor {
    /// Creates a descriptor. Normally called from derive-generated code.
    pub fn new(
        type_name: &'static str,
        type_id: TypeId,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        Self {
            type_name,
            type_id,
            properties,
        }
    }

    /// The name of the record type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The `TypeId` of the record type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The properties, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }
}

impl fmt::Debug for RecordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("type_name", &self.type_name)
            .field(
                "properties",
                &self.properties.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Property filters

/// Whether an explicit property list is included or excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeExclude {
    Include,
    Exclude,
}

impl IncludeExclude {
    /// Returns `true` for [`IncludeExclude::Exclude`].
    pub fn is_exclude(self) -> bool {
        matches!(self, IncludeExclude::Exclude)
    }
}

// -----------------------------------------------------------------------------
// Errors

/// A failed property read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAccessError {
    /// The record type has no such property.
    NoSuchProperty {
        type_name: &'static str,
        property: String,
    },
    /// The supplied value is not assignable to the property.
    TypeMismatch(SetValueError),
    /// The accessor refused the record instance.
    AccessorFailed {
        type_name: &'static str,
        property: String,
    },
}

impl fmt::Display for RecordAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordAccessError::NoSuchProperty {
                type_name,
                property,
            } => write!(f, "no such property: {type_name}.{property}"),
            RecordAccessError::TypeMismatch(err) => fmt::Display::fmt(err, f),
            RecordAccessError::AccessorFailed {
                type_name,
                property,
            } => write!(f, "accessor for {type_name}.{property} failed"),
        }
    }
}

impl core::error::Error for RecordAccessError {}

/// Construction would have produced a reader or writer with zero
/// properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoAccessorsError {
    type_name: &'static str,
    writers: bool,
}

impl NoAccessorsError {
    pub(crate) fn readers(type_name: &'static str) -> Self {
        Self {
            type_name,
            writers: false,
        }
    }

    pub(crate) fn writers(type_name: &'static str) -> Self {
        Self {
            type_name,
            writers: true,
        }
    }
}

impl fmt::Display for NoAccessorsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = if self.writers { "writable" } else { "readable" };
        write!(f, "{} has no {what} properties", self.type_name)
    }
}

impl core::error::Error for NoAccessorsError {}

/// A failed accessor registration on a reader or writer builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBuilderError {
    /// The property was registered twice.
    DuplicateProperty { property: &'static str },
}

impl fmt::Display for RecordBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordBuilderError::DuplicateProperty { property } => {
                write!(f, "property registered twice: {property}")
            }
        }
    }
}

impl core::error::Error for RecordBuilderError {}
