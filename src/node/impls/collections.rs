//! `Node` impls for the std keyed and ordered collections, plus
//! `IndexMap`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::{BTreeMap, HashMap, LinkedList, VecDeque};

use indexmap::IndexMap;

use crate::node::map::resolve_key;
use crate::node::{
    impl_node_common, ElementWriteError, LookupKey, MapKey, MapNode, MapWriteError, Node, NodeMut,
    NodeRef, SequenceNode, SetValueError,
};

// -----------------------------------------------------------------------------
// Keyed collections

/// Emits the `MapNode` body shared by the keyed collections; they agree
/// on `get`/`get_mut`/`insert`/`len`/`iter`.
macro_rules! keyed_map_body {
    ($k:ident, $v:ident) => {
        fn get_entry<'a>(&'a self, key: &LookupKey<'_>) -> Option<&'a dyn Node> {
            let key = resolve_key::<$k>(key)?;
            self.get(&key).map(|v| v as &dyn Node)
        }

        fn get_entry_mut<'a>(&'a mut self, key: &LookupKey<'_>) -> Option<&'a mut dyn Node> {
            let key = resolve_key::<$k>(key)?;
            self.get_mut(&key).map(|v| v as &mut dyn Node)
        }

        fn put_entry(
            &mut self,
            key: &LookupKey<'_>,
            value: Box<dyn Node>,
        ) -> Result<(), MapWriteError> {
            let Some(key) = resolve_key::<$k>(key) else {
                return Err(MapWriteError::KeyMismatch {
                    map_type: ::core::any::type_name::<Self>(),
                });
            };
            match value.take::<$v>() {
                Ok(value) => {
                    self.insert(key, value);
                    Ok(())
                }
                Err(value) => Err(MapWriteError::ValueMismatch(SetValueError::new(
                    ::core::any::type_name::<$v>(),
                    value.type_name(),
                ))),
            }
        }

        fn entry_count(&self) -> usize {
            self.len()
        }

        fn string_entries(&self) -> Option<Vec<(Option<&str>, &dyn Node)>> {
            self.iter()
                .map(|(k, v)| k.as_segment().map(|s| (s, v as &dyn Node)))
                .collect()
        }
    };
}

impl<K, V, S> Node for HashMap<K, V, S>
where
    K: MapKey,
    V: Node + Clone,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }
}

impl<K, V, S> MapNode for HashMap<K, V, S>
where
    K: MapKey,
    V: Node + Clone,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
    keyed_map_body!(K, V);
}

impl<K, V> Node for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Node + Clone,
{
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }
}

impl<K, V> MapNode for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Node + Clone,
{
    keyed_map_body!(K, V);
}

impl<K, V, S> Node for IndexMap<K, V, S>
where
    K: MapKey,
    V: Node + Clone,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }
}

impl<K, V, S> MapNode for IndexMap<K, V, S>
where
    K: MapKey,
    V: Node + Clone,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
    keyed_map_body!(K, V);
}

// -----------------------------------------------------------------------------
// Ordered collections

/// Emits `set_element`/`push_element` in terms of the surrounding type's
/// `element_mut` and `$push` method.
macro_rules! sequence_write_body {
    ($t:ident, $push:ident) => {
        fn set_element(
            &mut self,
            index: usize,
            value: Box<dyn Node>,
        ) -> Result<(), ElementWriteError> {
            let len = self.len();
            match SequenceNode::element_mut(self, index) {
                Some(slot) => slot.set(value).map_err(ElementWriteError::Mismatch),
                None => Err(ElementWriteError::OutOfBounds { len }),
            }
        }

        fn push_element(&mut self, value: Box<dyn Node>) -> Result<(), ElementWriteError> {
            match value.take::<$t>() {
                Ok(value) => {
                    self.$push(value);
                    Ok(())
                }
                Err(value) => Err(ElementWriteError::Mismatch(SetValueError::new(
                    ::core::any::type_name::<$t>(),
                    value.type_name(),
                ))),
            }
        }
    };
}

impl<T: Node + Clone> Node for Vec<T> {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(self)
    }
}

impl<T: Node + Clone> SequenceNode for Vec<T> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    sequence_write_body!(T, push);
}

impl<T: Node + Clone> Node for VecDeque<T> {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(self)
    }
}

impl<T: Node + Clone> SequenceNode for VecDeque<T> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    sequence_write_body!(T, push_back);
}

impl<T: Node + Clone> Node for LinkedList<T> {
    impl_node_common!();

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(self)
    }
}

impl<T: Node + Clone> SequenceNode for LinkedList<T> {
    fn element_count(&self) -> usize {
        self.len()
    }

    // Linked lists have no random access; positions resolve by walking
    // the iterator.
    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.iter().nth(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.iter_mut().nth(index).map(|v| v as &mut dyn Node)
    }

    sequence_write_body!(T, push_back);
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use std::collections::HashMap;

    use crate::node::{LookupKey, MapNode, Node, NodeKind, NodeRef, SequenceNode};

    #[test]
    fn string_keyed_map_lookup() {
        let mut map: HashMap<String, i32> = HashMap::new();
        map.insert("a".to_string(), 1);

        let found = map.get_entry(&LookupKey::Segment(Some("a")));
        assert_eq!(found.and_then(|v| v.downcast_ref::<i32>()), Some(&1));
        assert!(map.get_entry(&LookupKey::Segment(Some("b"))).is_none());
        // A string-keyed map cannot contain the null key.
        assert!(map.get_entry(&LookupKey::Segment(None)).is_none());
    }

    #[test]
    fn null_keyed_map_lookup() {
        let mut map: HashMap<Option<String>, i32> = HashMap::new();
        map.insert(None, 7);

        let found = map.get_entry(&LookupKey::Segment(None));
        assert_eq!(found.and_then(|v| v.downcast_ref::<i32>()), Some(&7));
    }

    #[test]
    fn typed_map_put_checks_value_type() {
        let mut map: HashMap<String, i32> = HashMap::new();
        let err = map
            .put_entry(&LookupKey::Segment(Some("a")), Box::new("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, crate::node::MapWriteError::ValueMismatch(_)));

        map.put_entry(&LookupKey::Segment(Some("a")), Box::new(3_i32))
            .unwrap();
        assert_eq!(map["a"], 3);
    }

    #[test]
    fn nested_values_classify() {
        let mut map: HashMap<String, Vec<i32>> = HashMap::new();
        map.insert("xs".to_string(), vec![1, 2]);
        let NodeRef::Map(as_map) = map.node_ref() else {
            panic!("expected a map");
        };
        let value = as_map.get_entry(&LookupKey::Segment(Some("xs"))).unwrap();
        assert_eq!(value.node_ref().kind(), NodeKind::Sequence);
    }

    #[test]
    fn sequence_set_and_push() {
        let mut xs = vec![1_i32, 2, 3];
        xs.set_element(1, Box::new(9_i32)).unwrap();
        assert_eq!(xs, [1, 9, 3]);
        assert!(xs.set_element(3, Box::new(0_i32)).is_err());
        assert!(xs.set_element(0, Box::new("nope".to_string())).is_err());
        xs.push_element(Box::new(4_i32)).unwrap();
        assert_eq!(xs, [1, 9, 3, 4]);
    }

    #[test]
    fn linked_list_walks_by_iterator() {
        let mut list: std::collections::LinkedList<String> =
            ["a", "b", "c"].map(str::to_string).into_iter().collect();
        assert_eq!(
            SequenceNode::element(&list, 2).and_then(|v| v.downcast_ref::<String>()),
            Some(&"c".to_string())
        );
        list.set_element(1, Box::new("B".to_string())).unwrap();
        assert_eq!(list.iter().nth(1).map(String::as_str), Some("B"));
    }
}
