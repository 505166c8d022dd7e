//! [`MapBuilder`]: write deeply nested values into a tree of mappings
//! without creating the intermediate mappings first.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

use indexmap::IndexMap;
use pathwalk_util::hash::FixedState;

use crate::node::{MapNode, Node, NodeMut, NodeRef, ObjectList, ObjectMap};
use crate::path::Path;

type Tree = IndexMap<String, TreeValue, FixedState>;

enum TreeValue {
    Branch(Tree),
    Leaf(Box<dyn Node>),
}

impl fmt::Debug for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeValue::Branch(tree) => f.debug_map().entries(tree.iter()).finish(),
            TreeValue::Leaf(value) => value.fmt(f),
        }
    }
}

// -----------------------------------------------------------------------------
// Errors

/// A rejected [`MapBuilder`] operation.
#[derive(Debug)]
pub enum MapBuilderError {
    /// The path runs into, or ends on, a value that has already been set.
    PathBlocked { path: Path, value: String },
    /// A key the mapping tree cannot hold: the null key, the empty
    /// string, or (in a source mapping) a non-string key.
    BadKey(String),
    /// A malformed path or value.
    IllegalArgument(String),
    /// The operation is not available at the current cursor.
    IllegalState(String),
}

impl fmt::Display for MapBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapBuilderError::PathBlocked { path, value } => {
                write!(f, "path \"{path}\" blocked by terminal value {value}")
            }
            MapBuilderError::BadKey(msg) => f.write_str(msg),
            MapBuilderError::IllegalArgument(msg) => f.write_str(msg),
            MapBuilderError::IllegalState(msg) => f.write_str(msg),
        }
    }
}

impl core::error::Error for MapBuilderError {}

fn path_blocked(path: Path, value: &TreeValue) -> MapBuilderError {
    MapBuilderError::PathBlocked {
        path,
        value: format!("{value:?}"),
    }
}

fn bad_key(msg: impl Into<String>) -> MapBuilderError {
    MapBuilderError::BadKey(msg.into())
}

fn illegal_argument(msg: impl Into<String>) -> MapBuilderError {
    MapBuilderError::IllegalArgument(msg.into())
}

// -----------------------------------------------------------------------------
// MapBuilder

/// A builder for nested insertion-ordered mappings, addressed by path
/// strings.
///
/// Missing intermediate mappings are tacitly created; a path that has
/// already been set refuses to be set again (even to the same value, and
/// even when the current value is null). Keys must be non-empty strings;
/// values can be anything, including null (store [`Null`](crate::Null)).
///
/// The builder holds a *cursor*. [`enter`](MapBuilder::enter) descends
/// (creating mappings as needed) and makes all subsequent paths relative
/// to the entered mapping; [`up`](MapBuilder::up),
/// [`root`](MapBuilder::root) and [`jump`](MapBuilder::jump) move back
/// out. Since mutators return `&mut Self`, the original's fluent chains
/// become `?`-chains:
///
/// # Examples
///
/// ```
/// use pathwalk::MapBuilder;
///
/// # fn demo() -> Result<(), pathwalk::MapBuilderError> {
/// let mut mb = MapBuilder::new();
/// mb.set("person.address.street", "12 Revolutionary Rd.".to_string())?
///     .set("person.address.state", "CA".to_string())?
///     .set("person.firstName", "John".to_string())?;
/// let map = mb.build();
/// assert_eq!(
///     format!("{map:?}"),
///     "{\"person\": {\"address\": {\"street\": \"12 Revolutionary Rd.\", \
///      \"state\": \"CA\"}, \"firstName\": \"John\"}}"
/// );
/// # Ok(())
/// # }
/// # demo().unwrap();
/// ```
pub struct MapBuilder {
    root: Tree,
    cursor: Path,
}

impl MapBuilder {
    /// Creates an empty `MapBuilder` with the cursor at the root mapping.
    pub fn new() -> Self {
        Self {
            root: Tree::default(),
            cursor: Path::empty(),
        }
    }

    /// Creates a `MapBuilder` seeded with the entries of `source`.
    ///
    /// The source is read, not modified; nested mappings are recursively
    /// wrapped. All keys must be non-empty strings.
    pub fn from_map(source: &dyn MapNode) -> Result<Self, MapBuilderError> {
        let mut root = Tree::default();
        init_tree(&mut root, source)?;
        Ok(Self {
            root,
            cursor: Path::empty(),
        })
    }

    /// Sets `path` to `value`.
    ///
    /// Refused when the path (or a prefix of it) has already been set
    /// (*path blocked*), and when the value is itself a mapping (use
    /// [`enter`](MapBuilder::enter) to create nested mappings).
    pub fn set(&mut self, path: &str, value: impl Node) -> Result<&mut Self, MapBuilderError> {
        self.set_boxed(path, Box::new(value))
    }

    /// Sets `path` to an already-boxed `value`. See
    /// [`set`](MapBuilder::set).
    pub fn set_boxed(
        &mut self,
        path: &str,
        value: Box<dyn Node>,
    ) -> Result<&mut Self, MapBuilderError> {
        let parsed = Path::parse(path);
        if parsed.is_empty() {
            return Err(illegal_argument("cannot set the empty path"));
        }
        let mut abs = self.cursor.clone();
        let mut tree = tree_at_mut(&mut self.root, &self.cursor);
        for i in 0..parsed.len() - 1 {
            let seg = valid_segment(&parsed, i)?;
            abs = abs.append(&Path::of([seg]));
            tree = descend_create(tree, seg, &abs)?;
        }
        let key = valid_segment(&parsed, parsed.len() - 1)?;
        if let Some(existing) = tree.get(key) {
            return Err(path_blocked(abs.append(&Path::of([key])), existing));
        }
        if matches!(value.node_ref(), NodeRef::Map(_)) {
            return Err(illegal_argument(
                "a mapping cannot be set as a value; use enter() instead",
            ));
        }
        tree.insert(key.to_string(), TreeValue::Leaf(value));
        Ok(self)
    }

    /// Descends into the mapping at `path`, creating missing mappings
    /// along the way, and makes all subsequent paths relative to it.
    ///
    /// Crossing or landing on a path that holds a terminal value is
    /// *path blocked*.
    pub fn enter(&mut self, path: &str) -> Result<&mut Self, MapBuilderError> {
        let parsed = Path::parse(path);
        let mut abs = self.cursor.clone();
        let mut tree = tree_at_mut(&mut self.root, &self.cursor);
        for i in 0..parsed.len() {
            let seg = valid_segment(&parsed, i)?;
            abs = abs.append(&Path::of([seg]));
            tree = descend_create(tree, seg, &abs)?;
        }
        self.cursor = abs;
        Ok(self)
    }

    /// Like [`enter`](MapBuilder::enter), but the path is taken relative
    /// to the root mapping rather than the current cursor.
    pub fn jump(&mut self, path: &str) -> Result<&mut Self, MapBuilderError> {
        self.cursor = Path::empty();
        self.enter(path)
    }

    /// Moves the cursor to the parent mapping.
    ///
    /// `parent` must name the mapping being moved into — the last segment
    /// of the parent's path — or be the empty string when the cursor sits
    /// directly under the root.
    pub fn up(&mut self, parent: &str) -> Result<&mut Self, MapBuilderError> {
        if self.cursor.is_empty() {
            return Err(MapBuilderError::IllegalState(
                "already in root map".to_string(),
            ));
        }
        if self.cursor.len() == 1 {
            if !parent.is_empty() {
                return Err(illegal_argument(
                    "specify \"\" to move up to the root map",
                ));
            }
        } else {
            let expected = self.cursor.segment(-2).unwrap_or("").to_string();
            if parent != expected {
                return Err(illegal_argument(format!(
                    "parent of \"{}\" is not \"{parent}\"; expected \"{expected}\"",
                    self.name()
                )));
            }
        }
        if let Some(parent_path) = self.cursor.parent() {
            self.cursor = parent_path;
        }
        Ok(self)
    }

    /// Moves the cursor back to the root mapping.
    pub fn root(&mut self) -> &mut Self {
        self.cursor = Path::empty();
        self
    }

    /// Returns the full path of the mapping under the cursor.
    pub fn where_(&self) -> String {
        self.cursor.to_string()
    }

    /// Returns the key under which the cursor's mapping sits in its
    /// parent, or the empty string at the root.
    pub fn name(&self) -> &str {
        if self.cursor.is_empty() {
            ""
        } else {
            self.cursor.segment(-1).unwrap_or("")
        }
    }

    /// Returns the value at `path`: `Some(value)` if the path is set
    /// (nested mappings are materialized), `None` otherwise.
    ///
    /// Descending across a terminal value yields `None`.
    pub fn poll(&self, path: &str) -> Option<Box<dyn Node>> {
        let parsed = Path::parse(path);
        if parsed.is_empty() {
            return None;
        }
        let mut tree = tree_at(&self.root, &self.cursor);
        for i in 0..parsed.len() - 1 {
            match parsed.segment(i as isize).and_then(|seg| tree.get(seg)) {
                Some(TreeValue::Branch(t)) => tree = t,
                _ => return None,
            }
        }
        let key = parsed.segment((parsed.len() - 1) as isize)?;
        match tree.get(key)? {
            TreeValue::Leaf(value) => Some(value.clone_node()),
            TreeValue::Branch(t) => Some(Box::new(build_tree(t))),
        }
    }

    /// Returns the value at `path` downcast to `T`, if set.
    pub fn get_as<T: Node>(&self, path: &str) -> Option<T> {
        self.poll(path)?.take::<T>().ok()
    }

    /// Returns `true` if `path` is set.
    ///
    /// An ancestor of a set path counts as set; so does any path whose
    /// first diverging step lands on a terminal value.
    pub fn is_set(&self, path: &str) -> Result<bool, MapBuilderError> {
        let parsed = Path::parse(path);
        if parsed.is_empty() {
            return Err(illegal_argument("cannot probe the empty path"));
        }
        let mut tree = tree_at(&self.root, &self.cursor);
        for i in 0..parsed.len() {
            let seg = valid_segment(&parsed, i)?;
            match tree.get(seg) {
                None => return Ok(false),
                Some(value) => {
                    if i == parsed.len() - 1 {
                        return Ok(true);
                    }
                    match value {
                        TreeValue::Leaf(_) => return Ok(true),
                        TreeValue::Branch(t) => tree = t,
                    }
                }
            }
        }
        Ok(false)
    }

    /// Unsets `path`. Returns quietly when the path is not set; crossing
    /// a terminal value is *path blocked*.
    pub fn unset(&mut self, path: &str) -> Result<&mut Self, MapBuilderError> {
        let parsed = Path::parse(path);
        if parsed.is_empty() {
            return Err(illegal_argument("cannot unset the empty path"));
        }
        let mut abs = self.cursor.clone();
        let mut tree = tree_at_mut(&mut self.root, &self.cursor);
        for i in 0..parsed.len() - 1 {
            let seg = valid_segment(&parsed, i)?;
            abs = abs.append(&Path::of([seg]));
            match tree.get_mut(seg) {
                None => return Ok(self),
                Some(TreeValue::Leaf(value)) => {
                    return Err(MapBuilderError::PathBlocked {
                        path: abs,
                        value: format!("{value:?}"),
                    });
                }
                Some(TreeValue::Branch(t)) => tree = t,
            }
        }
        let key = valid_segment(&parsed, parsed.len() - 1)?;
        tree.shift_remove(key);
        Ok(self)
    }

    /// Appends `element` to the sequence at `path`.
    ///
    /// An unset path is first set to a fresh
    /// [`ObjectList`](crate::node::ObjectList); a path holding anything
    /// other than a sequence is *path blocked*.
    pub fn add(&mut self, path: &str, element: impl Node) -> Result<&mut Self, MapBuilderError> {
        self.add_boxed(path, Box::new(element))
    }

    /// Appends an already-boxed `element`. See [`add`](MapBuilder::add).
    pub fn add_boxed(
        &mut self,
        path: &str,
        element: Box<dyn Node>,
    ) -> Result<&mut Self, MapBuilderError> {
        match self.probe_live(path) {
            Probe::Absent => {
                let mut list = ObjectList::new();
                list.push_boxed(element);
                self.set_boxed(path, Box::new(list))
            }
            Probe::Present => {
                let parsed = Path::parse(path);
                let mut tree = tree_at_mut(&mut self.root, &self.cursor);
                for i in 0..parsed.len() - 1 {
                    let Some(seg) = parsed.segment(i as isize) else {
                        unreachable!()
                    };
                    match tree.get_mut(seg) {
                        Some(TreeValue::Branch(t)) => tree = t,
                        // probe_live saw a branch chain here
                        _ => unreachable!(),
                    }
                }
                let abs = self.cursor.append(&parsed);
                let key = parsed.segment((parsed.len() - 1) as isize).unwrap_or("");
                match tree.get_mut(key) {
                    Some(TreeValue::Leaf(value)) => {
                        let description = format!("{value:?}");
                        match value.node_mut() {
                            NodeMut::Sequence(sequence) => {
                                sequence.push_element(element).map_err(|e| {
                                    illegal_argument(format!(
                                        "cannot add to sequence at \"{abs}\": {e}"
                                    ))
                                })?;
                                Ok(self)
                            }
                            _ => Err(MapBuilderError::PathBlocked {
                                path: abs,
                                value: description,
                            }),
                        }
                    }
                    Some(branch @ TreeValue::Branch(_)) => Err(path_blocked(abs, branch)),
                    None => unreachable!(),
                }
            }
        }
    }

    /// Returns the mapping tree built so far as a plain [`ObjectMap`],
    /// built from the root regardless of the cursor.
    ///
    /// The builder remains usable afterwards.
    pub fn build(&self) -> ObjectMap {
        build_tree(&self.root)
    }

    /// Walks the path leniently and reports whether a value is present.
    fn probe_live(&self, path: &str) -> Probe {
        let parsed = Path::parse(path);
        if parsed.is_empty() {
            return Probe::Absent;
        }
        let mut tree = tree_at(&self.root, &self.cursor);
        for i in 0..parsed.len() - 1 {
            match parsed.segment(i as isize).and_then(|seg| tree.get(seg)) {
                Some(TreeValue::Branch(t)) => tree = t,
                _ => return Probe::Absent,
            }
        }
        match parsed
            .segment((parsed.len() - 1) as isize)
            .and_then(|seg| tree.get(seg))
        {
            Some(_) => Probe::Present,
            None => Probe::Absent,
        }
    }
}

enum Probe {
    Absent,
    Present,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.build(), f)
    }
}

// -----------------------------------------------------------------------------
// Tree plumbing

fn valid_segment(path: &Path, index: usize) -> Result<&str, MapBuilderError> {
    match path.segment(index as isize) {
        None => Err(bad_key(format!("illegal null segment in path \"{path}\""))),
        Some("") => Err(bad_key(format!("illegal empty segment in path \"{path}\""))),
        Some(seg) => Ok(seg),
    }
}

fn tree_at<'t>(root: &'t Tree, cursor: &Path) -> &'t Tree {
    let mut tree = root;
    for seg in cursor.iter() {
        match seg.and_then(|s| tree.get(s)) {
            Some(TreeValue::Branch(t)) => tree = t,
            // The cursor only ever points at mappings it created.
            _ => unreachable!("cursor points at a mapping"),
        }
    }
    tree
}

fn tree_at_mut<'t>(root: &'t mut Tree, cursor: &Path) -> &'t mut Tree {
    let mut tree = root;
    for seg in cursor.iter() {
        let Some(seg) = seg else {
            unreachable!("cursor points at a mapping")
        };
        match tree.get_mut(seg) {
            Some(TreeValue::Branch(t)) => tree = t,
            _ => unreachable!("cursor points at a mapping"),
        }
    }
    tree
}

fn descend_create<'t>(
    tree: &'t mut Tree,
    segment: &str,
    abs: &Path,
) -> Result<&'t mut Tree, MapBuilderError> {
    let value = tree
        .entry(segment.to_string())
        .or_insert_with(|| TreeValue::Branch(Tree::default()));
    match value {
        TreeValue::Branch(t) => Ok(t),
        leaf @ TreeValue::Leaf(_) => Err(path_blocked(abs.clone(), leaf)),
    }
}

fn init_tree(tree: &mut Tree, source: &dyn MapNode) -> Result<(), MapBuilderError> {
    let Some(entries) = source.string_entries() else {
        return Err(bad_key("illegal key type in source map"));
    };
    for (key, value) in entries {
        let Some(key) = key else {
            return Err(bad_key("illegal null key in source map"));
        };
        if key.is_empty() {
            return Err(bad_key("illegal empty key in source map"));
        }
        match value.node_ref() {
            NodeRef::Map(nested) => {
                let mut sub = Tree::default();
                init_tree(&mut sub, nested)?;
                tree.insert(key.to_string(), TreeValue::Branch(sub));
            }
            _ => {
                tree.insert(key.to_string(), TreeValue::Leaf(value.clone_node()));
            }
        }
    }
    Ok(())
}

fn build_tree(tree: &Tree) -> ObjectMap {
    let mut map = ObjectMap::with_capacity(tree.len());
    for (key, value) in tree {
        match value {
            TreeValue::Branch(t) => {
                map.insert(key.clone(), build_tree(t));
            }
            TreeValue::Leaf(v) => {
                map.insert_boxed(Some(key.clone()), v.clone_node());
            }
        }
    }
    map
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::{String, ToString};

    use super::{MapBuilder, MapBuilderError};
    use crate::node::{Node, Null, ObjectList, ObjectMap};

    fn rendered(mb: &MapBuilder) -> String {
        format!("{:?}", mb.build())
    }

    #[test]
    fn set_nested_paths() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", "12 Revolutionary Rd.".to_string())
            .unwrap()
            .set("person.address.state", "CA".to_string())
            .unwrap()
            .set("person.firstName", "John".to_string())
            .unwrap()
            .set("person.lastName", "Smith".to_string())
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"person\": {\"address\": {\"street\": \"12 Revolutionary Rd.\", \
             \"state\": \"CA\"}, \"firstName\": \"John\", \"lastName\": \"Smith\"}}"
        );
    }

    #[test]
    fn null_values_are_fine() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", "12 Revolutionary Rd.".to_string())
            .unwrap()
            .set("person.address.state", Null)
            .unwrap()
            .set("person.lastName", Null)
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"person\": {\"address\": {\"street\": \"12 Revolutionary Rd.\", \
             \"state\": Null}, \"lastName\": Null}}"
        );
    }

    #[test]
    fn set_below_a_terminal_value_is_blocked() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", "12 Revolutionary Rd.".to_string())
            .unwrap();
        assert!(matches!(
            mb.set("person.address.street.foo", "bar".to_string()),
            Err(MapBuilderError::PathBlocked { .. })
        ));
    }

    #[test]
    fn set_twice_is_blocked_even_for_null() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", Null).unwrap();
        assert!(matches!(
            mb.set("person.address.street", Null),
            Err(MapBuilderError::PathBlocked { .. })
        ));
    }

    #[test]
    fn mapping_values_are_rejected() {
        let mut mb = MapBuilder::new();
        assert!(matches!(
            mb.set("person.address.street", ObjectMap::new()),
            Err(MapBuilderError::IllegalArgument(_))
        ));
        let mut mb = MapBuilder::new();
        let typed: std::collections::HashMap<String, i32> = std::collections::HashMap::new();
        assert!(matches!(
            mb.set("person.address.street", typed),
            Err(MapBuilderError::IllegalArgument(_))
        ));
    }

    #[test]
    fn set_across_a_terminal_value_is_blocked() {
        let mut mb = MapBuilder::new();
        mb.set("person.address", "foo".to_string()).unwrap();
        assert!(matches!(
            mb.set("person.address.street", "Sunset Blvd".to_string()),
            Err(MapBuilderError::PathBlocked { .. })
        ));
    }

    #[test]
    fn null_round_trips_through_build() {
        let mut mb = MapBuilder::new();
        mb.set("foo.bar.teapot", Null)
            .unwrap()
            .set("foo.bar.fun", true)
            .unwrap()
            .set("foo.bar.number", 8_i32)
            .unwrap();
        let built = mb.build();
        let bar = built
            .get("foo")
            .and_then(|v| v.downcast_ref::<ObjectMap>())
            .and_then(|m| m.get("bar"))
            .and_then(|v| v.downcast_ref::<ObjectMap>())
            .unwrap();
        assert!(bar.get("teapot").is_some_and(Node::is_null));
        assert_eq!(bar.get("fun").and_then(|v| v.downcast_ref::<bool>()), Some(&true));
        assert_eq!(bar.get("number").and_then(|v| v.downcast_ref::<i32>()), Some(&8));
    }

    #[test]
    fn poll_returns_values_and_materialized_mappings() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", "foo".to_string()).unwrap();

        assert_eq!(
            mb.get_as::<String>("person.address.street").as_deref(),
            Some("foo")
        );
        let address = mb.poll("person.address").unwrap();
        assert_eq!(format!("{address:?}"), "{\"street\": \"foo\"}");
        let person = mb.poll("person").unwrap();
        assert_eq!(format!("{person:?}"), "{\"address\": {\"street\": \"foo\"}}");

        assert!(mb.poll("person.address.street.teapot.coffee").is_none());
        assert!(mb.poll("person.address.street.teapot").is_none());
        assert!(mb.poll("person.address.teapot").is_none());
        assert!(mb.poll("person.teapot").is_none());
        assert!(mb.poll("teapot").is_none());
    }

    #[test]
    fn null_values_are_set_and_polled() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", Null).unwrap();
        assert!(mb.is_set("person.address.street").unwrap());
        assert!(mb.poll("person.address.street").unwrap().is_null());
    }

    #[test]
    fn enter_makes_paths_relative() {
        let mut mb = MapBuilder::new();
        mb.enter("person")
            .unwrap()
            .set("firstName", "John".to_string())
            .unwrap()
            .set("lastName", "Smith".to_string())
            .unwrap()
            .enter("address")
            .unwrap()
            .set("street", "12 Revolutionary Rd.".to_string())
            .unwrap()
            .set("state", "CA".to_string())
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"person\": {\"firstName\": \"John\", \"lastName\": \"Smith\", \
             \"address\": {\"street\": \"12 Revolutionary Rd.\", \"state\": \"CA\"}}}"
        );
    }

    #[test]
    fn enter_into_a_terminal_value_is_blocked() {
        let mut mb = MapBuilder::new();
        mb.set("foo.bar.bozo", "teapot".to_string()).unwrap();
        assert!(matches!(
            mb.enter("foo.bar.bozo"),
            Err(MapBuilderError::PathBlocked { .. })
        ));
        // Entering an existing mapping is fine.
        mb.enter("foo.bar").unwrap().set("ping", "pong".to_string()).unwrap();
        assert_eq!(
            rendered(mb.root()),
            "{\"foo\": {\"bar\": {\"bozo\": \"teapot\", \"ping\": \"pong\"}}}"
        );
    }

    #[test]
    fn up_requires_the_parent_name() {
        let mut mb = MapBuilder::new();
        mb.enter("person.address")
            .unwrap()
            .set("street", "Sunset Blvd".to_string())
            .unwrap()
            .up("person")
            .unwrap()
            .set("firstName", "John".to_string())
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"person\": {\"address\": {\"street\": \"Sunset Blvd\"}, \
             \"firstName\": \"John\"}}"
        );
    }

    #[test]
    fn up_with_the_wrong_name_is_rejected() {
        let mut mb = MapBuilder::new();
        mb.enter("person.address").unwrap();
        assert!(matches!(
            mb.up("teapot"),
            Err(MapBuilderError::IllegalArgument(_))
        ));
    }

    #[test]
    fn up_at_the_root_is_rejected() {
        let mut mb = MapBuilder::new();
        assert!(matches!(
            mb.up("teapot"),
            Err(MapBuilderError::IllegalState(_))
        ));
    }

    #[test]
    fn up_chains_to_the_root() {
        let mut mb = MapBuilder::new();
        mb.enter("department.manager.address")
            .unwrap()
            .set("street", "Sunset Blvd".to_string())
            .unwrap()
            .up("manager")
            .unwrap()
            .up("department")
            .unwrap()
            .up("")
            .unwrap()
            .set("foo", "bar".to_string())
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"department\": {\"manager\": {\"address\": \
             {\"street\": \"Sunset Blvd\"}}}, \"foo\": \"bar\"}"
        );
    }

    #[test]
    fn up_below_the_top_adds_to_the_parent() {
        let mut mb = MapBuilder::new();
        mb.enter("department.manager.address")
            .unwrap()
            .set("street", "Sunset Blvd".to_string())
            .unwrap()
            .up("manager")
            .unwrap()
            .up("department")
            .unwrap()
            .set("foo", "bar".to_string())
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"department\": {\"manager\": {\"address\": \
             {\"street\": \"Sunset Blvd\"}}, \"foo\": \"bar\"}}"
        );
    }

    #[test]
    fn root_jumps_all_the_way_back() {
        let mut mb = MapBuilder::new();
        mb.enter("person.address")
            .unwrap()
            .set("street", "Sunset Blvd".to_string())
            .unwrap()
            .root()
            .set("firstName", "John".to_string())
            .unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"person\": {\"address\": {\"street\": \"Sunset Blvd\"}}, \
             \"firstName\": \"John\"}"
        );
    }

    #[test]
    fn jump_is_absolute() {
        let mut mb = MapBuilder::new();
        mb.set("department.person.address.street", "Main St.".to_string())
            .unwrap()
            .set("car.brand.name", "BMW".to_string())
            .unwrap();
        mb.jump("department.person").unwrap();
        assert_eq!(mb.where_(), "department.person");
        assert_eq!(mb.name(), "person");
        mb.jump("car.brand").unwrap();
        assert_eq!(mb.where_(), "car.brand");
        mb.set("country", "DE".to_string()).unwrap();
        assert!(mb.is_set("country").unwrap());
        assert_eq!(
            mb.root().get_as::<String>("car.brand.country").as_deref(),
            Some("DE")
        );
    }

    #[test]
    fn is_set_covers_ancestors_and_terminals() {
        let mut mb = MapBuilder::new();
        mb.set("person.address", "foo".to_string()).unwrap();
        assert!(mb.is_set("person.address").unwrap());
        assert!(mb.is_set("person").unwrap());
        // The probe stops at the first terminal value on the way down.
        assert!(mb.is_set("person.address.street").unwrap());

        mb.unset("person.address").unwrap();
        assert!(!mb.is_set("person.address").unwrap());
        assert!(mb.is_set("person").unwrap());
        mb.unset("person").unwrap();
        assert!(!mb.is_set("person").unwrap());
    }

    #[test]
    fn unset_is_silent_on_absent_paths() {
        let mut mb = MapBuilder::new();
        mb.set("person.address.street", "Sunset Blvd".to_string())
            .unwrap()
            .set("person.address.zipcode", "CA 12345".to_string())
            .unwrap();

        assert!(!mb.is_set("person.address.country").unwrap());
        mb.unset("person.address.country").unwrap();
        mb.unset("person.address.country.planet").unwrap();

        mb.unset("person.address.street").unwrap();
        assert!(!mb.is_set("person.address.street").unwrap());
        assert!(mb.is_set("person.address.zipcode").unwrap());
        assert!(mb.is_set("person.address").unwrap());

        mb.unset("person").unwrap();
        assert!(!mb.is_set("person.address.zipcode").unwrap());
        assert!(!mb.is_set("person").unwrap());
    }

    #[test]
    fn source_maps_are_wrapped_recursively() {
        let mut nested = ObjectMap::new();
        nested.insert("teapot", "coffee".to_string());
        let mut source = ObjectMap::new();
        source.insert("foo", nested);
        source.insert("bar", true);

        let mut mb = MapBuilder::from_map(&source).unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"foo\": {\"teapot\": \"coffee\"}, \"bar\": true}"
        );
        mb.set("ping", 1_i32).unwrap().set("pong", false).unwrap();
        assert_eq!(
            rendered(&mb),
            "{\"foo\": {\"teapot\": \"coffee\"}, \"bar\": true, \"ping\": 1, \"pong\": false}"
        );
        // The existing branches stay extensible.
        mb.set("foo.sugar", false).unwrap();
        assert!(matches!(
            mb.set("foo.teapot", "tea".to_string()),
            Err(MapBuilderError::PathBlocked { .. })
        ));
    }

    #[test]
    fn source_map_keys_are_validated() {
        let mut source = ObjectMap::new();
        source.insert("", "bar".to_string());
        assert!(matches!(
            MapBuilder::from_map(&source),
            Err(MapBuilderError::BadKey(_))
        ));

        let mut source = ObjectMap::new();
        source.insert_null_key("bar".to_string());
        assert!(matches!(
            MapBuilder::from_map(&source),
            Err(MapBuilderError::BadKey(_))
        ));
    }

    #[test]
    fn source_map_null_values_round_trip() {
        let mut source = ObjectMap::new();
        source.insert_null("foo");
        let mb = MapBuilder::from_map(&source).unwrap();
        assert!(mb.build().get("foo").is_some_and(Node::is_null));
    }

    #[test]
    fn null_key_segments_are_rejected() {
        let mut mb = MapBuilder::new();
        // `^0` is the escape sequence for the null key.
        assert!(matches!(
            mb.set("person.^0.street", "foo".to_string()),
            Err(MapBuilderError::BadKey(_))
        ));
        assert!(matches!(
            mb.set("person..street", "foo".to_string()),
            Err(MapBuilderError::BadKey(_))
        ));
    }

    #[test]
    fn add_creates_and_extends_sequences() {
        let mut mb = MapBuilder::new();
        let mut seed = ObjectList::new();
        seed.push(1_i32);
        seed.push(2_i32);
        mb.set("foo", seed).unwrap();
        mb.add("foo", 3_i32).unwrap();

        let list = mb.get_as::<ObjectList>("foo").unwrap();
        let values: alloc::vec::Vec<_> = list
            .iter()
            .map(|v| *v.downcast_ref::<i32>().unwrap())
            .collect();
        assert_eq!(values, [1, 2, 3]);

        // Absent paths spring into existence as singleton sequences.
        mb.add("fresh", "first".to_string()).unwrap();
        assert_eq!(mb.get_as::<ObjectList>("fresh").unwrap().len(), 1);

        // Non-sequences block.
        mb.set("scalar", 1_i32).unwrap();
        assert!(matches!(
            mb.add("scalar", 2_i32),
            Err(MapBuilderError::PathBlocked { .. })
        ));
    }

    #[test]
    fn add_appends_to_typed_sequences() {
        let mut mb = MapBuilder::new();
        mb.set("xs", vec![1_i32, 2]).unwrap();
        mb.add("xs", 3_i32).unwrap();
        assert_eq!(mb.get_as::<Vec<i32>>("xs").unwrap(), [1, 2, 3]);
        // A type the sequence cannot hold is rejected.
        assert!(matches!(
            mb.add("xs", "nope".to_string()),
            Err(MapBuilderError::IllegalArgument(_))
        ));
    }

    #[test]
    fn build_leaves_the_builder_usable() {
        let mut mb = MapBuilder::new();
        mb.set("a", 1_i32).unwrap();
        let first = mb.build();
        mb.set("b", 2_i32).unwrap();
        let second = mb.build();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn built_maps_walk() {
        use crate::{Path, PathWalker};

        let mut mb = MapBuilder::new();
        mb.set("foo.bar.bozo", 42_i32).unwrap();
        let root = mb.build();
        let walker = PathWalker::new();
        assert_eq!(
            walker
                .read_as::<i32>(&root, &Path::parse("foo.bar.bozo"))
                .unwrap(),
            Some(&42)
        );
    }
}
