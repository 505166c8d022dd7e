//! The array categories: fixed-size sequences, split into reference
//! arrays and primitive arrays.

use alloc::boxed::Box;
use core::any::TypeId;

use crate::node::{ElementWriteError, Node, SetValueError};

/// The reference-array category: a fixed-size sequence with a declared
/// component type.
///
/// `[T; N]` and `Box<[T]>` classify here when `T` is not one of the
/// unboxed scalar types.
pub trait ArrayNode {
    /// Returns the number of elements.
    fn element_count(&self) -> usize;

    /// Returns the element at `index`, or `None` when out of bounds.
    fn element(&self, index: usize) -> Option<&dyn Node>;

    /// Returns the element at `index`, mutably.
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node>;

    /// Returns the `TypeId` of the declared component type.
    fn element_type_id(&self) -> TypeId;

    /// Returns the name of the declared component type.
    fn element_type_name(&self) -> &'static str;

    /// Replaces the element at `index` with `value`.
    fn set_element(&mut self, index: usize, value: Box<dyn Node>)
        -> Result<(), ElementWriteError>;
}

/// The primitive-array category: a fixed-size sequence of unboxed
/// numeric, boolean or character elements.
///
/// Writes travel as [`PrimitiveValue`](crate::node::PrimitiveValue); the
/// element performs its own numeric narrowing on assignment.
pub trait PrimitiveArrayNode {
    /// Returns the number of elements.
    fn element_count(&self) -> usize;

    /// Returns the element at `index`, or `None` when out of bounds.
    fn element(&self, index: usize) -> Option<&dyn Node>;

    /// Returns the element at `index`, mutably.
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node>;

    /// Returns the name of the element type.
    fn element_type_name(&self) -> &'static str;

    /// Writes a boxed value into the slot at `index`.
    ///
    /// The value must carry a primitive scalar
    /// ([`Node::as_primitive`]).
    fn write_element(&mut self, index: usize, value: Box<dyn Node>)
        -> Result<(), ElementWriteError>;
}

/// Shared write path for primitive arrays: bounds first, then scalar
/// extraction, then the element's own conversion.
pub(crate) fn write_primitive_element(
    slot: Option<&mut dyn Node>,
    len: usize,
    element_type_name: &'static str,
    value: Box<dyn Node>,
) -> Result<(), ElementWriteError> {
    let Some(slot) = slot else {
        return Err(ElementWriteError::OutOfBounds { len });
    };
    let Some(scalar) = value.as_primitive() else {
        return Err(ElementWriteError::Mismatch(SetValueError::new(
            element_type_name,
            value.type_name(),
        )));
    };
    slot.set_primitive(scalar).map_err(ElementWriteError::Mismatch)
}
