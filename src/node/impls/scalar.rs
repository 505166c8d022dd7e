//! Leaf impls for the scalar types and `String`.

use alloc::string::String;

use crate::node::{impl_node_common, Node, NodeMut, NodeRef, PrimitiveValue, SetValueError};

/// Leaf types without a primitive scalar form.
macro_rules! impl_opaque_leaf {
    ($($t:ty),* $(,)?) => {$(
        impl Node for $t {
            impl_node_common!();

            fn node_ref(&self) -> NodeRef<'_> {
                NodeRef::Opaque(self)
            }

            fn node_mut(&mut self) -> NodeMut<'_> {
                NodeMut::Opaque(self)
            }
        }
    )*};
}

impl_opaque_leaf!(String);

/// Integral leaves. The scalar travels widened to 128 bits; assignment
/// narrows with `as`.
macro_rules! impl_int_leaf {
    ($($t:ty),* $(,)?) => {$(
        impl Node for $t {
            impl_node_common!();

            fn node_ref(&self) -> NodeRef<'_> {
                NodeRef::Opaque(self)
            }

            fn node_mut(&mut self) -> NodeMut<'_> {
                NodeMut::Opaque(self)
            }

            fn as_primitive(&self) -> Option<PrimitiveValue> {
                Some(PrimitiveValue::Int(*self as i128))
            }

            fn set_primitive(&mut self, value: PrimitiveValue) -> Result<(), SetValueError> {
                match value {
                    PrimitiveValue::Int(v) => {
                        *self = v as $t;
                        Ok(())
                    }
                    PrimitiveValue::UInt(v) => {
                        *self = v as $t;
                        Ok(())
                    }
                    other => Err(SetValueError::new(
                        ::core::any::type_name::<$t>(),
                        other.kind_name(),
                    )),
                }
            }
        }
    )*};
}

impl_int_leaf!(u8, u16, u32, u64, usize, i8, i16, i32, i64, i128, isize);

// `u128` is the one integral type that does not fit `i128`.
impl Node for u128 {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Opaque(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Opaque(self)
    }

    fn as_primitive(&self) -> Option<PrimitiveValue> {
        Some(PrimitiveValue::UInt(*self))
    }

    fn set_primitive(&mut self, value: PrimitiveValue) -> Result<(), SetValueError> {
        match value {
            PrimitiveValue::Int(v) => {
                *self = v as u128;
                Ok(())
            }
            PrimitiveValue::UInt(v) => {
                *self = v;
                Ok(())
            }
            other => Err(SetValueError::new(
                core::any::type_name::<u128>(),
                other.kind_name(),
            )),
        }
    }
}

/// Floating-point leaves: accept integral scalars as well.
macro_rules! impl_float_leaf {
    ($($t:ty),* $(,)?) => {$(
        impl Node for $t {
            impl_node_common!();

            fn node_ref(&self) -> NodeRef<'_> {
                NodeRef::Opaque(self)
            }

            fn node_mut(&mut self) -> NodeMut<'_> {
                NodeMut::Opaque(self)
            }

            fn as_primitive(&self) -> Option<PrimitiveValue> {
                Some(PrimitiveValue::Float(*self as f64))
            }

            fn set_primitive(&mut self, value: PrimitiveValue) -> Result<(), SetValueError> {
                match value {
                    PrimitiveValue::Float(v) => {
                        *self = v as $t;
                        Ok(())
                    }
                    PrimitiveValue::Int(v) => {
                        *self = v as $t;
                        Ok(())
                    }
                    PrimitiveValue::UInt(v) => {
                        *self = v as $t;
                        Ok(())
                    }
                    other => Err(SetValueError::new(
                        ::core::any::type_name::<$t>(),
                        other.kind_name(),
                    )),
                }
            }
        }
    )*};
}

impl_float_leaf!(f32, f64);

impl Node for bool {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Opaque(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Opaque(self)
    }

    fn as_primitive(&self) -> Option<PrimitiveValue> {
        Some(PrimitiveValue::Bool(*self))
    }

    fn set_primitive(&mut self, value: PrimitiveValue) -> Result<(), SetValueError> {
        match value {
            PrimitiveValue::Bool(v) => {
                *self = v;
                Ok(())
            }
            other => Err(SetValueError::new("bool", other.kind_name())),
        }
    }
}

impl Node for char {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Opaque(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Opaque(self)
    }

    fn as_primitive(&self) -> Option<PrimitiveValue> {
        Some(PrimitiveValue::Char(*self))
    }

    fn set_primitive(&mut self, value: PrimitiveValue) -> Result<(), SetValueError> {
        match value {
            PrimitiveValue::Char(v) => {
                *self = v;
                Ok(())
            }
            other => Err(SetValueError::new("char", other.kind_name())),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
