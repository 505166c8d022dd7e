//! The object writer: traverses to the parent of the terminal location
//! with reader semantics, then dispatches the last segment to the
//! matching segment writer.

use alloc::boxed::Box;
use alloc::format;

use crate::node::{
    ArrayNode, ElementWriteError, LookupKey, MapNode, MapWriteError, Node, NodeMut,
    PrimitiveArrayNode, SequenceNode,
};
use crate::path::Path;
use crate::record::{getters_of, setters_of, Record};
use crate::walk::reader::ObjectReader;
use crate::walk::walker::KeyDeserializer;
use crate::walk::{parse_index, DeadEnd};

pub(crate) struct ObjectWriter<'w> {
    key_deserializer: Option<&'w dyn KeyDeserializer>,
}

impl<'w> ObjectWriter<'w> {
    pub(crate) fn new(key_deserializer: Option<&'w dyn KeyDeserializer>) -> Self {
        Self { key_deserializer }
    }

    /// Writes `value` at `path` under `root`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty.
    pub(crate) fn write(
        &self,
        root: &mut dyn Node,
        path: &Path,
        value: Box<dyn Node>,
    ) -> Result<(), DeadEnd> {
        assert!(!path.is_empty(), "cannot write to the empty path");
        let last = path.len() - 1;
        let mut current = root;
        for segment in 0..last {
            current = self.step_segment(current, path, segment)?;
        }
        self.write_segment(current, path, last, value)
    }

    /// The mutable twin of the object reader's dispatch: consumes one
    /// non-terminal segment.
    fn step_segment<'a>(
        &self,
        node: &'a mut dyn Node,
        path: &Path,
        segment: usize,
    ) -> Result<&'a mut dyn Node, DeadEnd> {
        macro_rules! step_indexed {
            ($container:ident) => {{
                let raw = path.segment(segment as isize);
                let Some(index) = parse_index(raw) else {
                    return Err(DeadEnd::index_expected(segment, raw));
                };
                let len = $container.element_count();
                match $container.element_mut(index) {
                    Some(element) => Ok(element),
                    None => Err(DeadEnd::index_out_of_bounds(segment, index, len)),
                }
            }};
        }

        match node.node_mut() {
            NodeMut::Null => Err(DeadEnd::null_value(segment)),
            NodeMut::Map(map) => self.step_map_segment(map, path, segment),
            NodeMut::Array(array) => step_indexed!(array),
            NodeMut::Sequence(sequence) => step_indexed!(sequence),
            NodeMut::PrimitiveArray(array) => step_indexed!(array),
            NodeMut::Record(record) => step_record_segment(record, path, segment),
            NodeMut::Opaque(value) => Err(DeadEnd::terminal_value(segment, value.type_name())),
        }
    }

    fn step_map_segment<'a>(
        &self,
        map: &'a mut dyn MapNode,
        path: &Path,
        segment: usize,
    ) -> Result<&'a mut dyn Node, DeadEnd> {
        let custom;
        let key = match self.reader().resolve_key(path, segment)? {
            Some(boxed) => {
                custom = boxed;
                LookupKey::Custom(custom.as_ref())
            }
            None => LookupKey::Segment(path.segment(segment as isize)),
        };
        let description = key.describe();
        map.get_entry_mut(&key)
            .ok_or_else(|| DeadEnd::no_such_key(segment, description))
    }

    /// Dispatches the terminal segment to the category's segment writer.
    fn write_segment(
        &self,
        parent: &mut dyn Node,
        path: &Path,
        segment: usize,
        value: Box<dyn Node>,
    ) -> Result<(), DeadEnd> {
        match parent.node_mut() {
            // A null parent cannot be extended; unlike mid-path nulls this
            // is a terminal-value condition.
            NodeMut::Null => Err(DeadEnd::terminal_value(segment, "null")),
            NodeMut::Map(map) => self.write_map_segment(map, path, segment, value),
            NodeMut::Array(array) => write_array_segment(array, path, segment, value),
            NodeMut::Sequence(sequence) => write_sequence_segment(sequence, path, segment, value),
            NodeMut::PrimitiveArray(array) => {
                write_primitive_array_segment(array, path, segment, value)
            }
            NodeMut::Record(record) => write_record_segment(record, path, segment, value),
            NodeMut::Opaque(leaf) => Err(DeadEnd::terminal_value(segment, leaf.type_name())),
        }
    }

    fn write_map_segment(
        &self,
        map: &mut dyn MapNode,
        path: &Path,
        segment: usize,
        value: Box<dyn Node>,
    ) -> Result<(), DeadEnd> {
        let custom;
        let key = match self.reader().resolve_key(path, segment)? {
            Some(boxed) => {
                custom = boxed;
                LookupKey::Custom(custom.as_ref())
            }
            None => LookupKey::Segment(path.segment(segment as isize)),
        };
        map.put_entry(&key, value).map_err(|e| match e {
            MapWriteError::NotModifiable => DeadEnd::not_modifiable(segment, "mapping"),
            MapWriteError::KeyMismatch { map_type } => {
                DeadEnd::type_mismatch(segment, format!("key not representable by {map_type}"))
            }
            MapWriteError::ValueMismatch(err) => DeadEnd::type_mismatch(segment, format!("{err}")),
        })
    }

    fn reader(&self) -> ObjectReader<'w> {
        ObjectReader::new(self.key_deserializer)
    }
}

fn step_record_segment<'a>(
    record: &'a mut dyn Record,
    path: &Path,
    segment: usize,
) -> Result<&'a mut dyn Node, DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(property) = raw.filter(|p| !p.is_empty()) else {
        return Err(DeadEnd::empty_segment(segment));
    };
    let type_name = record.type_name();
    let getters = getters_of(&*record);
    if getters.is_empty() {
        return Err(DeadEnd::terminal_value(segment, type_name));
    }
    let Some(getter) = getters.get(property) else {
        return Err(DeadEnd::no_such_property(segment, type_name, property));
    };
    getter.read_mut(record).ok_or_else(|| {
        DeadEnd::exception(
            segment,
            format!("getter for {type_name}.{property} refused the record instance"),
        )
    })
}

fn write_array_segment(
    array: &mut dyn ArrayNode,
    path: &Path,
    segment: usize,
    value: Box<dyn Node>,
) -> Result<(), DeadEnd> {
    // The component type check precedes index parsing.
    if !value.is_null() && value.ty_id() != array.element_type_id() {
        return Err(DeadEnd::type_mismatch(
            segment,
            format!(
                "cannot assign value of type {} to array of {}",
                value.type_name(),
                array.element_type_name()
            ),
        ));
    }
    let raw = path.segment(segment as isize);
    let Some(index) = parse_index(raw) else {
        return Err(DeadEnd::index_expected(segment, raw));
    };
    array.set_element(index, value).map_err(|e| match e {
        ElementWriteError::OutOfBounds { len } => DeadEnd::index_out_of_bounds(segment, index, len),
        ElementWriteError::NotModifiable => DeadEnd::not_modifiable(segment, "array"),
        ElementWriteError::Mismatch(err) => DeadEnd::type_mismatch(segment, format!("{err}")),
    })
}

fn write_sequence_segment(
    sequence: &mut dyn SequenceNode,
    path: &Path,
    segment: usize,
    value: Box<dyn Node>,
) -> Result<(), DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(index) = parse_index(raw) else {
        return Err(DeadEnd::index_expected(segment, raw));
    };
    sequence.set_element(index, value).map_err(|e| match e {
        ElementWriteError::OutOfBounds { len } => DeadEnd::index_out_of_bounds(segment, index, len),
        ElementWriteError::NotModifiable => DeadEnd::not_modifiable(segment, "sequence"),
        ElementWriteError::Mismatch(err) => DeadEnd::type_mismatch(segment, format!("{err}")),
    })
}

fn write_primitive_array_segment(
    array: &mut dyn PrimitiveArrayNode,
    path: &Path,
    segment: usize,
    value: Box<dyn Node>,
) -> Result<(), DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(index) = parse_index(raw) else {
        return Err(DeadEnd::index_expected(segment, raw));
    };
    array.write_element(index, value).map_err(|e| match e {
        ElementWriteError::OutOfBounds { len } => DeadEnd::index_out_of_bounds(segment, index, len),
        ElementWriteError::NotModifiable => DeadEnd::not_modifiable(segment, "primitive array"),
        ElementWriteError::Mismatch(err) => DeadEnd::type_mismatch(segment, format!("{err}")),
    })
}

fn write_record_segment(
    record: &mut dyn Record,
    path: &Path,
    segment: usize,
    value: Box<dyn Node>,
) -> Result<(), DeadEnd> {
    let raw = path.segment(segment as isize);
    let Some(property) = raw.filter(|p| !p.is_empty()) else {
        return Err(DeadEnd::empty_segment(segment));
    };
    let type_name = record.type_name();
    let setters = setters_of(&*record);
    if setters.is_empty() {
        return Err(DeadEnd::terminal_value(segment, type_name));
    }
    let Some(setter) = setters.get(property) else {
        return Err(DeadEnd::no_such_property(segment, type_name, property));
    };
    setter
        .write(record, value)
        .map_err(|err| DeadEnd::type_mismatch(segment, format!("{err}")))
}
