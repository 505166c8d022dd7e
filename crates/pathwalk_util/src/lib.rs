//! Support crate for `pathwalk`: fixed-seed hashing and a [`TypeId`]-keyed
//! map used by the accessor registry.
//!
//! [`TypeId`]: core::any::TypeId
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
