//! The object reader: the read-side dispatch switch and its per-category
//! segment handlers.

use alloc::boxed::Box;
use core::any::Any;

use crate::node::{
    ArrayNode, LookupKey, MapNode, Node, NodeRef, PrimitiveArrayNode, SequenceNode,
};
use crate::path::Path;
use crate::record::{getters_of, Record};
use crate::walk::walker::KeyDeserializer;
use crate::walk::{parse_index, DeadEnd};

/// Reads a path off an object graph, one segment at a time.
pub(crate) struct ObjectReader<'w> {
    key_deserializer: Option<&'w dyn KeyDeserializer>,
}

impl<'w> ObjectReader<'w> {
    pub(crate) fn new(key_deserializer: Option<&'w dyn KeyDeserializer>) -> Self {
        Self { key_deserializer }
    }

    /// Follows `path` from `node` to its end.
    pub(crate) fn read<'a>(
        &self,
        node: &'a dyn Node,
        path: &Path,
    ) -> Result<&'a dyn Node, DeadEnd> {
        let mut current = node;
        for segment in 0..path.len() {
            current = self.read_segment(current, path, segment)?;
        }
        Ok(current)
    }

    /// Classifies `node` and consumes one path segment.
    pub(crate) fn read_segment<'a>(
        &self,
        node: &'a dyn Node,
        path: &Path,
        segment: usize,
    ) -> Result<&'a dyn Node, DeadEnd> {
        match node.node_ref() {
            NodeRef::Null => Err(DeadEnd::null_value(segment)),
            NodeRef::Map(map) => self.read_map_segment(map, path, segment),
            NodeRef::Array(array) => read_array_segment(array, path, segment),
            NodeRef::Sequence(sequence) => read_sequence_segment(sequence, path, segment),
            NodeRef::PrimitiveArray(array) => read_primitive_array_segment(array, path, segment),
            NodeRef::Record(record) => read_record_segment(record, path, segment),
            NodeRef::Opaque(value) => Err(DeadEnd::terminal_value(segment, value.type_name())),
        }
    }

    fn read_map_segment<'a>(
        &self,
        map: &'a dyn MapNode,
        path: &Path,
        segment: usize,
    ) -> Result<&'a dyn Node, DeadEnd> {
        let custom;
        let key = match self.resolve_key(path, segment)? {
            Some(boxed) => {
                custom = boxed;
                LookupKey::Custom(custom.as_ref())
            }
            None => LookupKey::Segment(path.segment(segment as isize)),
        };
        map.get_entry(&key)
            .ok_or_else(|| DeadEnd::no_such_key(segment, key.describe()))
    }

    /// Runs the key deserializer, if any.
    pub(crate) fn resolve_key(
        &self,
        path: &Path,
        segment: usize,
    ) -> Result<Option<Box<dyn Any>>, DeadEnd> {
        match self.key_deserializer {
            None => Ok(None),
            Some(kd) => kd
                .deserialize(path, segment)
                .map(Some)
                .map_err(|e| DeadEnd::key_deserialization_failed(segment, &e)),
        }
    }
}

fn read_sequence_segment<'a>(
    sequence: &'a dyn SequenceNode,
    path: &Path,
    segment: usize,
) -> Result<&'a dyn Node, DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(index) = parse_index(raw) else {
        return Err(DeadEnd::index_expected(segment, raw));
    };
    sequence
        .element(index)
        .ok_or_else(|| DeadEnd::index_out_of_bounds(segment, index, sequence.element_count()))
}

fn read_array_segment<'a>(
    array: &'a dyn ArrayNode,
    path: &Path,
    segment: usize,
) -> Result<&'a dyn Node, DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(index) = parse_index(raw) else {
        return Err(DeadEnd::index_expected(segment, raw));
    };
    array
        .element(index)
        .ok_or_else(|| DeadEnd::index_out_of_bounds(segment, index, array.element_count()))
}

fn read_primitive_array_segment<'a>(
    array: &'a dyn PrimitiveArrayNode,
    path: &Path,
    segment: usize,
) -> Result<&'a dyn Node, DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(index) = parse_index(raw) else {
        return Err(DeadEnd::index_expected(segment, raw));
    };
    array
        .element(index)
        .ok_or_else(|| DeadEnd::index_out_of_bounds(segment, index, array.element_count()))
}

fn read_record_segment<'a>(
    record: &'a dyn Record,
    path: &Path,
    segment: usize,
) -> Result<&'a dyn Node, DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(property) = raw.filter(|p| !p.is_empty()) else {
        return Err(DeadEnd::empty_segment(segment));
    };
    let getters = getters_of(record);
    if getters.is_empty() {
        return Err(DeadEnd::terminal_value(segment, record.type_name()));
    }
    let Some(getter) = getters.get(property) else {
        return Err(DeadEnd::no_such_property(
            segment,
            record.type_name(),
            property,
        ));
    };
    getter.read(record).ok_or_else(|| {
        DeadEnd::exception(
            segment,
            alloc::format!(
                "getter for {}.{property} refused the record instance",
                record.type_name()
            ),
        )
    })
}
