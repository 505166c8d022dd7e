//! The [`Path`] type: an immutable sequence of segments addressing a value
//! inside an object graph.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use std::sync::OnceLock;

// Segment separator.
const SEP: char = '.';
// Escape character.
const ESC: char = '^';
// Escape sequence for the null key.
const NULL_SEGMENT: &str = "^0";

/// A path to a value within an object graph, such as `employee.address.city`.
///
/// A path string consists of segments separated by the dot character.
/// Sequence and array indices are ordinary segments: `employees.3.city` is
/// the `city` of the fourth element of `employees`. Segments are not
/// constrained in content — a mapping key can be anything, including the
/// empty string and the null key — so nothing is rejected at parse time.
///
/// # Escaping
///
/// - A segment containing the separator escapes it with the circumflex:
///   key `my.awkward.key` is written `my^.awkward^.key`.
/// - The bare segment `^0` denotes the *null key*. A key whose literal
///   value is `^0` is written `^^0`.
/// - `^^` is a literal circumflex. A circumflex followed by anything else
///   is taken literally as well.
/// - A zero-length segment stands for the empty-string key: `lookups..name`.
///   A path string ending in a dot therefore ends with an empty segment.
///
/// Use [`Path::escape`] to escape individual segments when assembling path
/// strings by hand. Segments passed to [`Path::of`] or
/// [`Path::from_segments`] are taken verbatim and must not be escaped.
///
/// # Examples
///
/// ```
/// use pathwalk::Path;
///
/// let path = Path::parse("employee.address.city");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.segment(0), Some("employee"));
/// assert_eq!(path.segment(-1), Some("city"));
///
/// let null_key = Path::parse("lookups.^0");
/// assert_eq!(null_key.segment(1), None);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Arc<[Option<Box<str>>]>,
}

impl Path {
    /// Returns the empty path, consisting of zero segments.
    ///
    /// All empty paths share one backing allocation.
    pub fn empty() -> Path {
        static EMPTY: OnceLock<Path> = OnceLock::new();
        EMPTY
            .get_or_init(|| Path {
                segments: Arc::from(Vec::new()),
            })
            .clone()
    }

    /// Parses a path string.
    ///
    /// The empty string parses to the empty path.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathwalk::Path;
    ///
    /// let path = Path::parse("a.^0.b");
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.segment(1), None); // the null key
    ///
    /// let path = Path::parse("a..b");
    /// assert_eq!(path.segment(1), Some(""));
    /// ```
    pub fn from(path: &str) -> Path {
        Self::parse(path)
    }

    /// Parses a path string. Alias of [`Path::from`].
    pub fn parse(path: &str) -> Path {
        if path.is_empty() {
            return Path::empty();
        }
        Path {
            segments: Arc::from(parse_segments(path)),
        }
    }

    /// Returns a path consisting of the given segments, taken verbatim.
    ///
    /// *Do not escape the segments.* Empty strings are allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathwalk::Path;
    ///
    /// let path = Path::of(["lookups", "my.awkward.key"]);
    /// assert_eq!(path.len(), 2);
    /// assert_eq!(path.to_string(), "lookups.my^.awkward^.key");
    /// ```
    pub fn of<I>(segments: I) -> Path
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let segments: Vec<Option<Box<str>>> = segments
            .into_iter()
            .map(|s| Some(s.into().into_boxed_str()))
            .collect();
        if segments.is_empty() {
            return Path::empty();
        }
        Path {
            segments: Arc::from(segments),
        }
    }

    /// Returns a path consisting of the given segments, taken verbatim.
    ///
    /// Unlike [`Path::of`], the segments may contain the null key (`None`).
    pub fn from_segments<I, S>(segments: I) -> Path
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let segments: Vec<Option<Box<str>>> = segments
            .into_iter()
            .map(|s| s.map(|s| s.into().into_boxed_str()))
            .collect();
        if segments.is_empty() {
            return Path::empty();
        }
        Path {
            segments: Arc::from(segments),
        }
    }

    /// Escapes a single path segment.
    ///
    /// Only use this when assembling complete path strings from individual
    /// segments; the segment-based constructors take segments verbatim.
    /// `None` (the null key) is escaped to `^0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathwalk::Path;
    ///
    /// assert_eq!(Path::escape(Some("my.key")), "my^.key");
    /// assert_eq!(Path::escape(None), "^0");
    /// assert_eq!(Path::escape(Some("^0")), "^^0");
    /// ```
    pub fn escape(segment: Option<&str>) -> Cow<'_, str> {
        let Some(segment) = segment else {
            return Cow::Borrowed(NULL_SEGMENT);
        };
        if !segment.contains([SEP, ESC]) {
            return Cow::Borrowed(segment);
        }
        let mut out = String::with_capacity(segment.len() + 3);
        for c in segment.chars() {
            match c {
                SEP => {
                    out.push(ESC);
                    out.push(SEP);
                }
                ESC => {
                    out.push(ESC);
                    out.push(ESC);
                }
                _ => out.push(c),
            }
        }
        Cow::Owned(out)
    }

    /// Returns the segment at `index`, or `None` for the null key.
    ///
    /// A negative index counts from the end of the path; `-1` is the last
    /// segment.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn segment(&self, index: isize) -> Option<&str> {
        let resolved = self.resolve_index(index);
        self.segments[resolved].as_deref()
    }

    /// Returns a path starting at segment `offset`.
    ///
    /// A negative offset counts from the end of the path.
    ///
    /// # Panics
    ///
    /// Panics if the offset is out of bounds.
    pub fn sub_path(&self, offset: isize) -> Path {
        let from = self.resolve_index(offset);
        Path {
            segments: Arc::from(self.segments[from..].to_vec()),
        }
    }

    /// Returns a path of `length` segments starting at segment `offset`.
    ///
    /// A negative offset counts from the end of the path. Unlike
    /// [`sub_path`](Path::sub_path), the offset follows offset-plus-length
    /// range semantics: it may sit one past the last segment when the
    /// requested length is zero.
    ///
    /// # Panics
    ///
    /// Panics if the specified range does not fit within the path.
    pub fn sub_path_len(&self, offset: isize, length: usize) -> Path {
        let len = self.segments.len();
        let resolved = if offset < 0 {
            (len as isize).checked_add(offset)
        } else {
            Some(offset)
        };
        let from = match resolved {
            Some(i) if (0..=len as isize).contains(&i) => i as usize,
            _ => panic!("sub-path offset {offset} out of bounds for path of length {len}"),
        };
        let to = from
            .checked_add(length)
            .filter(|to| *to <= len)
            .unwrap_or_else(|| {
                panic!("sub-path [{from}, {from}+{length}) out of bounds for path of length {len}")
            });
        Path {
            segments: Arc::from(self.segments[from..to].to_vec()),
        }
    }

    /// Returns this path without its first segment, or `None` if the path
    /// is empty. A single-segment path shifts to the empty path.
    pub fn shift(&self) -> Option<Path> {
        match self.segments.len() {
            0 => None,
            1 => Some(Path::empty()),
            _ => Some(self.sub_path(1)),
        }
    }

    /// Returns this path without its last segment, or `None` if the path
    /// is empty. A single-segment path's parent is the empty path.
    pub fn parent(&self) -> Option<Path> {
        match self.segments.len() {
            0 => None,
            1 => Some(Path::empty()),
            n => Some(self.sub_path_len(0, n - 1)),
        }
    }

    /// Returns this path with every segment that denotes a nonnegative
    /// integer index removed.
    ///
    /// Any non-empty segment consisting solely of ASCII digits counts as an
    /// index, whatever its magnitude, leading zeros included.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathwalk::Path;
    ///
    /// let path = Path::parse("employees.3.address.007");
    /// assert_eq!(path.canonical(), Path::parse("employees.address"));
    /// ```
    pub fn canonical(&self) -> Path {
        let canonical: Vec<Option<Box<str>>> = self
            .segments
            .iter()
            .filter(|seg| !seg.as_deref().is_some_and(is_index_segment))
            .cloned()
            .collect();
        if canonical.is_empty() {
            return Path::empty();
        }
        Path {
            segments: Arc::from(canonical),
        }
    }

    /// Returns the concatenation of this path and `other`.
    pub fn append(&self, other: &Path) -> Path {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut segments = self.segments.to_vec();
        segments.extend(other.segments.iter().cloned());
        Path {
            segments: Arc::from(segments),
        }
    }

    /// Parses `path` and appends it to this path.
    pub fn append_parsed(&self, path: &str) -> Path {
        self.append(&Path::parse(path))
    }

    /// Returns a path with the segment at `index` replaced.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn replace(&self, index: usize, segment: Option<&str>) -> Path {
        assert!(
            index < self.segments.len(),
            "segment index {index} out of bounds for path of length {}",
            self.segments.len()
        );
        let mut segments = self.segments.to_vec();
        segments[index] = segment.map(Box::from);
        Path {
            segments: Arc::from(segments),
        }
    }

    /// Returns a path with the order of the segments reversed.
    pub fn reverse(&self) -> Path {
        if self.segments.len() < 2 {
            return self.clone();
        }
        let mut segments = self.segments.to_vec();
        segments.reverse();
        Path {
            segments: Arc::from(segments),
        }
    }

    /// Returns an iterator over the segments; `None` is the null key.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<&str>> + '_ {
        self.segments.iter().map(|s| s.as_deref())
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if this path consists of zero segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if this path is non-empty and every segment is
    /// non-null and non-empty.
    pub fn is_deep_not_empty(&self) -> bool {
        !self.is_empty()
            && self
                .segments
                .iter()
                .all(|s| s.as_deref().is_some_and(|s| !s.is_empty()))
    }

    fn resolve_index(&self, index: isize) -> usize {
        let len = self.segments.len();
        let resolved = if index < 0 {
            (len as isize).checked_add(index)
        } else {
            Some(index)
        };
        match resolved {
            Some(i) if (0..len as isize).contains(&i) => i as usize,
            _ => panic!("segment index {index} out of bounds for path of length {len}"),
        }
    }
}

impl fmt::Display for Path {
    /// Formats this path as a string, properly escaped.
    ///
    /// [`Path::parse`] applied to the output reproduces this path.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&Path::escape(segment.as_deref()))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl FromStr for Path {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl Default for Path {
    fn default() -> Self {
        Path::empty()
    }
}

// -----------------------------------------------------------------------------
// Parsing

fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_segments(path: &str) -> Vec<Option<Box<str>>> {
    let chars: Vec<char> = path.chars().collect();
    let len = chars.len();
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut i = 0;
    while i < len {
        match chars[i] {
            SEP => {
                segments.push(Some(core::mem::take(&mut buf).into_boxed_str()));
            }
            ESC => {
                if i + 1 < len {
                    let c = chars[i + 1];
                    if c == SEP || c == ESC {
                        buf.push(c);
                        i += 1;
                    } else if c == '0' && buf.is_empty() && (i + 2 == len || chars[i + 2] == SEP) {
                        // `^0` spanning an entire segment is the null key;
                        // the trailing separator is consumed with it.
                        segments.push(None);
                        i += 2;
                    } else {
                        buf.push(ESC);
                    }
                } else {
                    buf.push(ESC);
                }
            }
            c => buf.push(c),
        }
        i += 1;
    }
    if !buf.is_empty() {
        segments.push(Some(buf.into_boxed_str()));
    } else if chars[len - 1] == SEP {
        segments.push(Some(Box::from("")));
    }
    segments
}

// -----------------------------------------------------------------------------
// Serde

#[cfg(feature = "serde")]
mod serde_impls {
    use super::Path;

    impl serde::Serialize for Path {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> serde::Deserialize<'de> for Path {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct Visitor;

            impl serde::de::Visitor<'_> for Visitor {
                type Value = Path;

                fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    f.write_str("a path string")
                }

                fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Path, E> {
                    Ok(Path::parse(v))
                }
            }

            deserializer.deserialize_str(Visitor)
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use super::Path;

    fn segments(path: &Path) -> Vec<Option<&str>> {
        path.iter().collect()
    }

    #[test]
    fn parse_simple() {
        let path = Path::parse("employee.address.city");
        assert_eq!(
            segments(&path),
            [Some("employee"), Some("address"), Some("city")]
        );
    }

    #[test]
    fn parse_null_key() {
        let path = Path::parse("a.^0.b");
        assert_eq!(segments(&path), [Some("a"), None, Some("b")]);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn parse_trailing_null_key() {
        let path = Path::parse("lookups.^0");
        assert_eq!(segments(&path), [Some("lookups"), None]);
    }

    #[test]
    fn parse_empty_segments() {
        assert_eq!(segments(&Path::parse("a..b")), [Some("a"), Some(""), Some("b")]);
        assert_eq!(segments(&Path::parse("a.")), [Some("a"), Some("")]);
        assert_eq!(segments(&Path::parse(".a")), [Some(""), Some("a")]);
        assert_eq!(segments(&Path::parse(".")), [Some(""), Some("")]);
    }

    #[test]
    fn parse_escapes() {
        assert_eq!(
            segments(&Path::parse("my^.awkward^.key.b")),
            [Some("my.awkward.key"), Some("b")]
        );
        // An escaped escape character.
        assert_eq!(segments(&Path::parse("super^^awkward")), [Some("super^awkward")]);
        // A dangling escape character is literal.
        assert_eq!(segments(&Path::parse("super^awkward")), [Some("super^awkward")]);
        assert_eq!(segments(&Path::parse("oops^")), [Some("oops^")]);
        // `^^0` is the literal two-character segment `^0`.
        assert_eq!(segments(&Path::parse("^^0")), [Some("^0")]);
        // `^0` glued to more characters is not the null key.
        assert_eq!(segments(&Path::parse("^0x")), [Some("^0x")]);
        assert_eq!(segments(&Path::parse("x^0")), [Some("x^0")]);
    }

    #[test]
    fn parse_null_key_then_trailing_dot() {
        assert_eq!(segments(&Path::parse("^0.")), [None, Some("")]);
    }

    #[test]
    fn parse_empty() {
        assert!(Path::parse("").is_empty());
        assert_eq!(Path::parse("").len(), 0);
    }

    #[test]
    fn format_round_trip() {
        for input in [
            "employee.address.city",
            "a.^0.b",
            "a..b",
            "a.",
            "my^.key",
            "^^0",
            "orders.3.items.0.price",
            "^0",
        ] {
            let path = Path::parse(input);
            assert_eq!(Path::parse(&path.to_string()), path, "round trip of {input:?}");
        }
    }

    #[test]
    fn format_round_trip_verbatim_segments() {
        // Segments constructed verbatim survive format + parse, including
        // ones that need full escaping.
        let awkward = Path::from_segments([
            Some("plain"),
            None,
            Some(""),
            Some("dots.and^carets"),
            Some("^0"),
            Some("a^.b"),
            Some("a^^b"),
        ]);
        assert_eq!(Path::parse(&awkward.to_string()), awkward);
    }

    #[test]
    fn escape_segment() {
        assert_eq!(Path::escape(Some("plain")), "plain");
        assert_eq!(Path::escape(Some("my.key")), "my^.key");
        assert_eq!(Path::escape(None), "^0");
        assert_eq!(Path::escape(Some("^0")), "^^0");
        assert_eq!(Path::escape(Some("")), "");
    }

    #[test]
    fn segment_negative_index() {
        let path = Path::parse("a.b.c");
        assert_eq!(path.segment(-1), Some("c"));
        assert_eq!(path.segment(-3), Some("a"));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn segment_out_of_bounds() {
        Path::parse("a.b").segment(2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn segment_negative_out_of_bounds() {
        Path::parse("a.b").segment(-3);
    }

    #[test]
    fn sub_paths() {
        let path = Path::parse("a.b.c.d");
        assert_eq!(path.sub_path(1), Path::parse("b.c.d"));
        assert_eq!(path.sub_path(-2), Path::parse("c.d"));
        assert_eq!(path.sub_path_len(1, 2), Path::parse("b.c"));
        assert_eq!(path.sub_path_len(-3, 2), Path::parse("b.c"));
        // A zero-length range may start right after the last segment.
        assert_eq!(path.sub_path_len(4, 0), Path::empty());
        assert_eq!(path.sub_path_len(0, 0), Path::empty());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn sub_path_len_rejects_overlong_ranges() {
        Path::parse("a.b").sub_path_len(1, 2);
    }

    #[test]
    fn shift_and_parent() {
        assert_eq!(Path::empty().shift(), None);
        assert_eq!(Path::empty().parent(), None);
        assert_eq!(Path::parse("a").shift(), Some(Path::empty()));
        assert_eq!(Path::parse("a").parent(), Some(Path::empty()));
        assert_eq!(Path::parse("a.b.c").shift(), Some(Path::parse("b.c")));
        assert_eq!(Path::parse("a.b.c").parent(), Some(Path::parse("a.b")));
    }

    #[test]
    fn canonical_strips_indices() {
        let path = Path::parse("orders.3.items.0.price");
        assert_eq!(path.canonical(), Path::parse("orders.items.price"));
        // Leading zeros and out-of-range magnitudes still count as indices.
        let path = Path::parse("a.007.b.99999999999999999999999999");
        assert_eq!(path.canonical(), Path::parse("a.b"));
        // Empty and null segments are not indices.
        let path = Path::from_segments([Some("a"), Some(""), None, Some("1")]);
        assert_eq!(path.canonical(), Path::from_segments([Some("a"), Some(""), None]));
    }

    #[test]
    fn append_and_replace() {
        let path = Path::parse("a.b");
        assert_eq!(path.append(&Path::parse("c.d")), Path::parse("a.b.c.d"));
        assert_eq!(path.append_parsed("c"), Path::parse("a.b.c"));
        assert_eq!(path.append(&Path::empty()), path);
        assert_eq!(Path::empty().append(&path), path);
        assert_eq!(path.replace(1, Some("x")), Path::parse("a.x"));
        assert_eq!(path.replace(0, None), Path::parse("^0.b"));
    }

    #[test]
    fn reverse() {
        assert_eq!(Path::parse("a.b.c").reverse(), Path::parse("c.b.a"));
        assert_eq!(Path::parse("a").reverse(), Path::parse("a"));
        assert_eq!(Path::empty().reverse(), Path::empty());
    }

    #[test]
    fn deep_not_empty() {
        assert!(Path::parse("a.b").is_deep_not_empty());
        assert!(!Path::empty().is_deep_not_empty());
        assert!(!Path::parse("a..b").is_deep_not_empty());
        assert!(!Path::parse("a.^0").is_deep_not_empty());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut paths = [
            Path::parse("b"),
            Path::parse("a.c"),
            Path::parse("a"),
            Path::parse("a.b"),
        ];
        paths.sort();
        assert_eq!(
            paths,
            [
                Path::parse("a"),
                Path::parse("a.b"),
                Path::parse("a.c"),
                Path::parse("b"),
            ]
        );
    }

    #[test]
    fn empty_is_shared() {
        assert_eq!(Path::parse(""), Path::empty());
        assert_eq!(Path::of(Vec::<&str>::new()), Path::empty());
    }
}
