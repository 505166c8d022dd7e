//! Hashing support for the pathwalk crates.
//!
//! The insertion-ordered maps hash with [`FixedState`], re-exported from
//! the `foldhash` crate: a fixed-seed state whose results depend only on
//! the input. [`TypeIdHashState`] covers the one other hashing concern,
//! [`TypeId`] keys, which already are high-quality hashes of their own
//! and only need to be passed through.
//!
//! [`TypeId`]: core::any::TypeId

use core::hash::{BuildHasher, Hasher};

pub use foldhash::fast::FixedState;

// -----------------------------------------------------------------------------
// TypeIdHashState

/// A hasher for keys that already are hashes, such as `TypeId`.
///
/// A single `write_u64` passes the value straight through. The 128-bit
/// and byte-slice forms fold their input onto the 64-bit state, so the
/// hasher keeps working whichever way `TypeId` feeds its bits.
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for window in bytes.chunks(8) {
            let mut buf = [0_u8; 8];
            buf[..window.len()].copy_from_slice(window);
            self.hash ^= u64::from_ne_bytes(buf);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    #[inline]
    fn write_u128(&mut self, i: u128) {
        self.hash = (i as u64) ^ ((i >> 64) as u64);
    }
}

/// Hash state for [`TypeIdHasher`].
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use core::hash::BuildHasher;
/// use pathwalk_util::hash::TypeIdHashState;
///
/// let a = TypeIdHashState.hash_one(TypeId::of::<u8>());
/// let b = TypeIdHashState.hash_one(TypeId::of::<u8>());
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHashState;

impl BuildHasher for TypeIdHashState {
    type Hasher = TypeIdHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        TypeIdHasher::default()
    }
}

// -----------------------------------------------------------------------------
// Tests
