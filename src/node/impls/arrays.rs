//! Fixed-size sequences: `[T; N]` and `Box<[T]>`.
//!
//! Whether such a value is a reference array or a primitive array is
//! decided by a runtime probe of the element type, so that `[i32; 4]` and
//! `[String; 4]` take different write paths through one pair of impls.

use alloc::boxed::Box;
use core::any::TypeId;

use crate::node::array::write_primitive_element;
use crate::node::{
    impl_node_common, is_primitive_type, ArrayNode, ElementWriteError, Node, NodeMut, NodeRef,
    PrimitiveArrayNode,
};

impl<T: Node + Clone, const N: usize> Node for [T; N] {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        if is_primitive_type(TypeId::of::<T>()) {
            NodeRef::PrimitiveArray(self)
        } else {
            NodeRef::Array(self)
        }
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        if is_primitive_type(TypeId::of::<T>()) {
            NodeMut::PrimitiveArray(self)
        } else {
            NodeMut::Array(self)
        }
    }
}

impl<T: Node + Clone, const N: usize> ArrayNode for [T; N] {
    fn element_count(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn set_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), ElementWriteError> {
        match self.get_mut(index) {
            Some(slot) => slot.set(value).map_err(ElementWriteError::Mismatch),
            None => Err(ElementWriteError::OutOfBounds { len: N }),
        }
    }
}

impl<T: Node + Clone, const N: usize> PrimitiveArrayNode for [T; N] {
    fn element_count(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    fn element_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn write_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), ElementWriteError> {
        let slot = self.get_mut(index).map(|v| v as &mut dyn Node);
        write_primitive_element(slot, N, core::any::type_name::<T>(), value)
    }
}

impl<T: Node + Clone> Node for Box<[T]> {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        if is_primitive_type(TypeId::of::<T>()) {
            NodeRef::PrimitiveArray(self)
        } else {
            NodeRef::Array(self)
        }
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        if is_primitive_type(TypeId::of::<T>()) {
            NodeMut::PrimitiveArray(self)
        } else {
            NodeMut::Array(self)
        }
    }
}

impl<T: Node + Clone> ArrayNode for Box<[T]> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn set_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), ElementWriteError> {
        let len = self.len();
        match self.get_mut(index) {
            Some(slot) => slot.set(value).map_err(ElementWriteError::Mismatch),
            None => Err(ElementWriteError::OutOfBounds { len }),
        }
    }
}

impl<T: Node + Clone> PrimitiveArrayNode for Box<[T]> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    fn element_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn write_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), ElementWriteError> {
        let len = self.len();
        let slot = self.get_mut(index).map(|v| v as &mut dyn Node);
        write_primitive_element(slot, len, core::any::type_name::<T>(), value)
    }
}

// -----------------------------------------------------------------------------
// Tests
