//! The process-wide accessor caches.
//!
//! Two insert-only tables map a record type to its insertion-ordered
//! getter (resp. setter) map. A type is introspected exactly once; the
//! built map is leaked and shared for the process lifetime. Lookups under
//! an existing entry take the read lock only; the write lock is held over
//! the miss path.

use alloc::boxed::Box;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use pathwalk_util::hash::FixedState;
use pathwalk_util::TypeIdMap;

use crate::record::{Getter, Record, RecordDescriptor, Setter};

/// Property name → read handle, in declaration order.
pub type GetterMap = IndexMap<&'static str, Getter, FixedState>;

/// Property name → write handle, in declaration order.
pub type SetterMap = IndexMap<&'static str, Setter, FixedState>;

static READERS: RwLock<TypeIdMap<&'static GetterMap>> = RwLock::new(TypeIdMap::new());
static WRITERS: RwLock<TypeIdMap<&'static SetterMap>> = RwLock::new(TypeIdMap::new());

/// Returns the cached getter map for a record type.
///
/// The map contains one [`Getter`] per property and may be empty for
/// property-less records, which the traversal engine treats as terminal
/// values.
pub fn getters_for(descriptor: &'static RecordDescriptor) -> &'static GetterMap {
    let type_id = descriptor.type_id();
    if let Some(map) = READERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
    {
        return map;
    }
    let mut table = READERS.write().unwrap_or_else(PoisonError::into_inner);
    table.get_or_insert(type_id, || Box::leak(Box::new(build_getters(descriptor))))
}

/// Returns the cached getter map for a record value.
pub fn getters_of(record: &dyn Record) -> &'static GetterMap {
    getters_for(record.record_descriptor())
}

/// Returns the cached setter map for a record type.
///
/// Read-only properties carry no setter; the map may be empty.
pub fn setters_for(descriptor: &'static RecordDescriptor) -> &'static SetterMap {
    let type_id = descriptor.type_id();
    if let Some(map) = WRITERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
    {
        return map;
    }
    let mut table = WRITERS.write().unwrap_or_else(PoisonError::into_inner);
    table.get_or_insert(type_id, || Box::leak(Box::new(build_setters(descriptor))))
}

/// Returns the cached setter map for a record value.
pub fn setters_of(record: &dyn Record) -> &'static SetterMap {
    setters_for(record.record_descriptor())
}

fn build_getters(descriptor: &'static RecordDescriptor) -> GetterMap {
    descriptor
        .properties()
        .iter()
        .map(|p| (p.name, Getter::from_descriptor(p)))
        .collect()
}

fn build_setters(descriptor: &'static RecordDescriptor) -> SetterMap {
    descriptor
        .properties()
        .iter()
        .filter_map(|p| p.set.map(|set| (p.name, Setter::from_descriptor(p, set))))
        .collect()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use pathwalk_derive::Record;

    use super::{getters_for, setters_for};
    use crate::record::RecordType;

    #[derive(Record, Debug, Clone)]
    struct Address {
        street: String,
        #[record(readonly)]
        zipcode: String,
    }

    #[test]
    fn maps_are_cached_and_shared() {
        let a = getters_for(Address::descriptor());
        let b = getters_for(Address::descriptor());
        assert!(core::ptr::eq(a, b));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn readonly_properties_have_no_setter() {
        let setters = setters_for(Address::descriptor());
        assert!(setters.contains_key("street"));
        assert!(!setters.contains_key("zipcode"));
    }

    #[test]
    fn getter_reads_through_the_handle() {
        let address = Address {
            street: "Sunset Blvd".to_string(),
            zipcode: "CA 12345".to_string(),
        };
        let getters = getters_for(Address::descriptor());
        let value = getters.get("street").unwrap().read(&address).unwrap();
        assert_eq!(
            value.downcast_ref::<String>().map(String::as_str),
            Some("Sunset Blvd")
        );
        // A getter refuses a foreign record type.
        #[derive(Record, Debug, Clone)]
        struct Other {
            street: String,
        }
        let other = Other {
            street: "x".to_string(),
        };
        assert!(getters.get("street").unwrap().read(&other).is_none());
    }
}
