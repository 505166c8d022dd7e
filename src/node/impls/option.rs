//! `Option<T>` bridges the null category: `None` classifies as null,
//! `Some(v)` classifies as `v` does.

use alloc::boxed::Box;
use core::any::Any;

use crate::node::{Node, NodeMut, NodeRef, SetValueError};

impl<T: Node + Clone> Node for Option<T> {
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn node_ref(&self) -> NodeRef<'_> {
        match self {
            None => NodeRef::Null,
            Some(v) => v.node_ref(),
        }
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        match self {
            None => NodeMut::Null,
            Some(v) => v.node_mut(),
        }
    }

    /// Accepts an `Option<T>`, a bare `T`, or any null-classified value
    /// (which clears the option).
    fn set(&mut self, value: Box<dyn Node>) -> Result<(), SetValueError> {
        let value = match value.take::<Self>() {
            Ok(v) => {
                *self = v;
                return Ok(());
            }
            Err(v) => v,
        };
        let value = match value.take::<T>() {
            Ok(v) => {
                *self = Some(v);
                return Ok(());
            }
            Err(v) => v,
        };
        if value.is_null() {
            *self = None;
            Ok(())
        } else {
            Err(SetValueError::new(
                core::any::type_name::<Self>(),
                value.type_name(),
            ))
        }
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn resolve(&self) -> &dyn Node {
        match self {
            Some(v) => v.resolve(),
            None => self,
        }
    }

    fn as_primitive(&self) -> Option<crate::node::PrimitiveValue> {
        self.as_ref().and_then(Node::as_primitive)
    }

    fn set_primitive(
        &mut self,
        value: crate::node::PrimitiveValue,
    ) -> Result<(), SetValueError> {
        match self {
            Some(v) => v.set_primitive(value),
            None => Err(SetValueError::new(
                core::any::type_name::<Self>(),
                value.kind_name(),
            )),
        }
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }
}

// -----------------------------------------------------------------------------
// Tests
