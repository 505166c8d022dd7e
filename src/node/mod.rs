//! The object-graph model: the [`Node`] trait, its structural categories,
//! and the dynamic containers for heterogeneous graphs.
//!
//! Every value that can take part in a traversal implements [`Node`]. A
//! node classifies itself into exactly one structural category through
//! [`Node::node_ref`], and the traversal engine dispatches on that
//! classification:
//!
//! - [`NodeRef::Null`] — `Option::None` and the [`Null`] unit value;
//! - [`NodeRef::Map`] — keyed mappings ([`MapNode`]);
//! - [`NodeRef::Array`] — fixed-size arrays of non-primitive elements
//!   ([`ArrayNode`]);
//! - [`NodeRef::Sequence`] — growable ordered collections
//!   ([`SequenceNode`]);
//! - [`NodeRef::PrimitiveArray`] — fixed-size arrays of numeric, boolean
//!   or character elements ([`PrimitiveArrayNode`]);
//! - [`NodeRef::Record`] — values with named properties
//!   ([`Record`](crate::record::Record));
//! - [`NodeRef::Opaque`] — everything else; a leaf for path purposes.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::record::Record;

mod array;
mod impls;
mod map;
mod object_list;
mod object_map;
mod sequence;

pub use array::{ArrayNode, PrimitiveArrayNode};
pub use map::{LookupKey, MapKey, MapNode, MapWriteError};
pub use object_list::ObjectList;
pub use object_map::ObjectMap;
pub use sequence::SequenceNode;

// -----------------------------------------------------------------------------
// Node

/// A value that can take part in a path traversal.
///
/// The trait combines `Any`-style downcasting with a single classification
/// method, [`node_ref`], that sorts the value into one of the closed set of
/// structural categories. Implementations exist for the scalar types,
/// `String`, `Option`, the std collections with string-like keys, fixed
/// arrays and boxed slices, the dynamic containers [`ObjectMap`] /
/// [`ObjectList`], and any struct deriving
/// [`Record`](pathwalk_derive::Record).
///
/// # Examples
///
/// ```
/// use pathwalk::node::{Node, NodeKind};
///
/// assert_eq!(42.node_ref().kind(), NodeKind::Opaque);
/// assert_eq!(vec![1, 2, 3].node_ref().kind(), NodeKind::Sequence);
/// assert_eq!([1, 2, 3].node_ref().kind(), NodeKind::PrimitiveArray);
/// assert_eq!(["a".to_string()].node_ref().kind(), NodeKind::Array);
/// assert_eq!(None::<i32>.node_ref().kind(), NodeKind::Null);
/// ```
///
/// [`node_ref`]: Node::node_ref
pub trait Node: Any + Send + Sync + fmt::Debug {
    /// Returns the name of the underlying type.
    fn type_name(&self) -> &'static str;

    /// Casts this value to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Casts this value to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Casts this boxed value to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Classifies this value into its structural category.
    fn node_ref(&self) -> NodeRef<'_>;

    /// Classifies this value into its structural category, mutably.
    fn node_mut(&mut self) -> NodeMut<'_>;

    /// Performs a type-checked assignment of `value` to this value.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathwalk::node::Node;
    ///
    /// let mut target = 0_i32;
    /// target.set(Box::new(7_i32)).unwrap();
    /// assert_eq!(target, 7);
    /// assert!(target.set(Box::new("seven".to_string())).is_err());
    /// ```
    fn set(&mut self, value: Box<dyn Node>) -> Result<(), SetValueError>;

    /// Returns an owned copy of this value.
    fn clone_node(&self) -> Box<dyn Node>;

    /// Peels `Option` wrappers off this value.
    ///
    /// `Some(v)` resolves to `v`; everything else resolves to itself.
    fn resolve(&self) -> &dyn Node;

    /// Returns this value as a primitive scalar, if it is one.
    fn as_primitive(&self) -> Option<PrimitiveValue> {
        None
    }

    /// Assigns a primitive scalar to this value, converting as the target
    /// type sees fit.
    fn set_primitive(&mut self, value: PrimitiveValue) -> Result<(), SetValueError> {
        Err(SetValueError::new(self.type_name(), value.kind_name()))
    }

    /// Returns the [`TypeId`] of the underlying value.
    ///
    /// `Any::type_id` called on a `Box<dyn Node>` reports the box, not the
    /// content; this method always reports the content.
    fn ty_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Returns `true` if this value classifies as the null category.
    fn is_null(&self) -> bool {
        matches!(self.node_ref(), NodeRef::Null)
    }
}

impl dyn Node {
    /// Returns `true` if the underlying value is a `T`.
    #[inline]
    pub fn is<T: Node>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts this node to a concrete type.
    #[inline]
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts this node to a concrete type, mutably.
    #[inline]
    pub fn downcast_mut<T: Node>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Takes the concrete value out of a boxed node.
    ///
    /// On a type mismatch the box is handed back unchanged.
    pub fn take<T: Node>(self: Box<Self>) -> Result<T, Box<dyn Node>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(v) => Ok(*v),
                // The downcast was checked above.
                Err(_) => unreachable!(),
            }
        } else {
            Err(self)
        }
    }
}

// -----------------------------------------------------------------------------
// Classification

/// The structural categories a node can classify into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Map,
    Array,
    Sequence,
    PrimitiveArray,
    Record,
    Opaque,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Null => "null",
            NodeKind::Map => "map",
            NodeKind::Array => "array",
            NodeKind::Sequence => "sequence",
            NodeKind::PrimitiveArray => "primitive array",
            NodeKind::Record => "record",
            NodeKind::Opaque => "opaque value",
        })
    }
}

/// An immutable classification of a node, carrying the category-specific
/// view the traversal engine dispatches on.
pub enum NodeRef<'a> {
    Null,
    Map(&'a dyn MapNode),
    Array(&'a dyn ArrayNode),
    Sequence(&'a dyn SequenceNode),
    PrimitiveArray(&'a dyn PrimitiveArrayNode),
    Record(&'a dyn Record),
    Opaque(&'a dyn Node),
}

impl NodeRef<'_> {
    /// Returns the bare category of this classification.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Null => NodeKind::Null,
            NodeRef::Map(_) => NodeKind::Map,
            NodeRef::Array(_) => NodeKind::Array,
            NodeRef::Sequence(_) => NodeKind::Sequence,
            NodeRef::PrimitiveArray(_) => NodeKind::PrimitiveArray,
            NodeRef::Record(_) => NodeKind::Record,
            NodeRef::Opaque(_) => NodeKind::Opaque,
        }
    }
}

/// A mutable classification of a node.
pub enum NodeMut<'a> {
    Null,
    Map(&'a mut dyn MapNode),
    Array(&'a mut dyn ArrayNode),
    Sequence(&'a mut dyn SequenceNode),
    PrimitiveArray(&'a mut dyn PrimitiveArrayNode),
    Record(&'a mut dyn Record),
    Opaque(&'a mut dyn Node),
}

impl NodeMut<'_> {
    /// Returns the bare category of this classification.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMut::Null => NodeKind::Null,
            NodeMut::Map(_) => NodeKind::Map,
            NodeMut::Array(_) => NodeKind::Array,
            NodeMut::Sequence(_) => NodeKind::Sequence,
            NodeMut::PrimitiveArray(_) => NodeKind::PrimitiveArray,
            NodeMut::Record(_) => NodeKind::Record,
            NodeMut::Opaque(_) => NodeKind::Opaque,
        }
    }
}

// -----------------------------------------------------------------------------
// Null

/// The null value.
///
/// `Null` is how heterogeneous containers such as [`ObjectMap`] store "a
/// value that is present but null". It classifies as the null category,
/// exactly like `Option::None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Null;

impl Node for Null {
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Null>()
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
        NodeRef::Null
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Null
    }

    fn set(&mut self, value: Box<dyn Node>) -> Result<(), SetValueError> {
        if value.is_null() {
            Ok(())
        } else {
            Err(SetValueError::new(self.type_name(), value.type_name()))
        }
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(Null)
    }

    fn resolve(&self) -> &dyn Node {
        self
    }
}

// -----------------------------------------------------------------------------
// Primitive scalars

/// A primitive scalar in transit between a boxed node and a primitive
/// array slot.
///
/// Integral values travel widened; the receiving primitive performs its
/// own narrowing on assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    Char(char),
    Int(i128),
    UInt(u128),
    Float(f64),
}

impl PrimitiveValue {
    /// Returns a short name for the scalar kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Bool(_) => "bool",
            PrimitiveValue::Char(_) => "char",
            PrimitiveValue::Int(_) => "integer",
            PrimitiveValue::UInt(_) => "integer",
            PrimitiveValue::Float(_) => "float",
        }
    }
}

/// Returns `true` if `id` identifies one of the unboxed scalar types that
/// make a fixed array a primitive array.
pub(crate) fn is_primitive_type(id: TypeId) -> bool {
    id == TypeId::of::<bool>()
        || id == TypeId::of::<char>()
        || id == TypeId::of::<u8>()
        || id == TypeId::of::<u16>()
        || id == TypeId::of::<u32>()
        || id == TypeId::of::<u64>()
        || id == TypeId::of::<u128>()
        || id == TypeId::of::<usize>()
        || id == TypeId::of::<i8>()
        || id == TypeId::of::<i16>()
        || id == TypeId::of::<i32>()
        || id == TypeId::of::<i64>()
        || id == TypeId::of::<i128>()
        || id == TypeId::of::<isize>()
        || id == TypeId::of::<f32>()
        || id == TypeId::of::<f64>()
}

// -----------------------------------------------------------------------------
// Errors

/// A failed type-checked assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValueError {
    expected: &'static str,
    found: &'static str,
}

impl SetValueError {
    pub fn new(expected: &'static str, found: &'static str) -> Self {
        Self { expected, found }
    }

    /// The name of the type that was expected.
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// The name of the type that was supplied.
    pub fn found(&self) -> &'static str {
        self.found
    }
}

impl fmt::Display for SetValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot assign value of type {} to target of type {}",
            self.found, self.expected
        )
    }
}

impl core::error::Error for SetValueError {}

/// A failed indexed write into a sequence or array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementWriteError {
    /// The container rejects modification.
    NotModifiable,
    /// The index falls outside `[0, len)`.
    OutOfBounds { len: usize },
    /// The value is not assignable to the element type.
    Mismatch(SetValueError),
}

impl fmt::Display for ElementWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementWriteError::NotModifiable => f.write_str("container is not modifiable"),
            ElementWriteError::OutOfBounds { len } => {
                write!(f, "index out of bounds for length {len}")
            }
            ElementWriteError::Mismatch(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for ElementWriteError {}

// -----------------------------------------------------------------------------
// Shared impl plumbing

/// Emits the `Any` plumbing plus the default `set`/`clone_node`/`resolve`
/// bodies shared by nearly every `Node` impl.
macro_rules! impl_node_common {
    () => {
        fn type_name(&self) -> &'static str {
            ::core::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }

        fn into_any(
            self: ::alloc::boxed::Box<Self>,
        ) -> ::alloc::boxed::Box<dyn ::core::any::Any> {
            self
        }

        fn set(
            &mut self,
            value: ::alloc::boxed::Box<dyn $crate::node::Node>,
        ) -> ::core::result::Result<(), $crate::node::SetValueError> {
            match value.take::<Self>() {
                Ok(v) => {
                    *self = v;
                    Ok(())
                }
                Err(v) => Err($crate::node::SetValueError::new(
                    ::core::any::type_name::<Self>(),
                    v.type_name(),
                )),
            }
        }

        fn clone_node(&self) -> ::alloc::boxed::Box<dyn $crate::node::Node> {
            ::alloc::boxed::Box::new(::core::clone::Clone::clone(self))
        }

        fn resolve(&self) -> &dyn $crate::node::Node {
            self
        }
    };
}

pub(crate) use impl_node_common;

// -----------------------------------------------------------------------------
// Tests
