#![doc = include_str!("../README.md")]

extern crate alloc;

// `pathwalk` must resolve inside this crate as well: the derive macro
// emits paths through the crate name.
extern crate self as pathwalk;

// -----------------------------------------------------------------------------
// Modules

pub mod builder;
pub mod node;
pub mod path;
pub mod record;
pub mod walk;

// -----------------------------------------------------------------------------
// Top-level exports

pub use builder::{MapBuilder, MapBuilderError};
pub use node::{Node, NodeKind, NodeMut, NodeRef, Null, ObjectList, ObjectMap, PrimitiveValue};
pub use path::Path;
pub use record::{RecordReader, RecordWriter};
pub use walk::{ErrorCode, KeyDeserializer, PathWalker, PathWalkerError};

pub use pathwalk_derive as derive;
pub use pathwalk_derive::Record;
