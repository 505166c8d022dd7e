//! The dead-end sentinel and the errors a traversal can surface.

use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::path::Path;

// -----------------------------------------------------------------------------
// ErrorCode

/// The reasons a traversal dead-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Descended into a null value mid-path.
    NullValue,
    /// Key absent in a mapping.
    NoSuchKey,
    /// Property absent on a record.
    NoSuchProperty,
    /// Non-integral segment applied to a sequence or array.
    IndexExpected,
    /// Integral index out of range.
    IndexOutOfBounds,
    /// Empty segment applied to a record.
    EmptySegment,
    /// Tried to descend past, or write into, a leaf value.
    TerminalValue,
    /// Write value incompatible with the target type.
    TypeMismatch,
    /// Target container rejects modification.
    NotModifiable,
    /// The user-supplied key deserializer failed.
    KeyDeserializationFailed,
    /// Any other invocation failure.
    Exception,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCode::NullValue => "NULL_VALUE",
            ErrorCode::NoSuchKey => "NO_SUCH_KEY",
            ErrorCode::NoSuchProperty => "NO_SUCH_PROPERTY",
            ErrorCode::IndexExpected => "INDEX_EXPECTED",
            ErrorCode::IndexOutOfBounds => "INDEX_OUT_OF_BOUNDS",
            ErrorCode::EmptySegment => "EMPTY_SEGMENT",
            ErrorCode::TerminalValue => "TERMINAL_VALUE",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::NotModifiable => "NOT_MODIFIABLE",
            ErrorCode::KeyDeserializationFailed => "KEY_DESERIALIZATION_FAILED",
            ErrorCode::Exception => "EXCEPTION",
        })
    }
}

// -----------------------------------------------------------------------------
// PathWalkerError

/// A dead-ended traversal, raised by [`PathWalker`](crate::PathWalker)
/// when error suppression is off.
#[derive(Debug, Clone)]
pub struct PathWalkerError {
    code: ErrorCode,
    path: Path,
    segment: usize,
    message: String,
}

impl PathWalkerError {
    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The path whose traversal dead-ended.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The index of the segment at which the traversal dead-ended.
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// The detail message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PathWalkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at segment {} of path \"{}\": {}",
            self.code, self.segment, self.path, self.message
        )
    }
}

impl core::error::Error for PathWalkerError {}

// -----------------------------------------------------------------------------
// KeyDeserializationError

/// A failure reported by a [`KeyDeserializer`](crate::walk::KeyDeserializer).
#[derive(Debug, Clone)]
pub struct KeyDeserializationError {
    message: String,
}

impl KeyDeserializationError {
    /// Creates an error with the given detail message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The detail message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for KeyDeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key deserialization failed: {}", self.message)
    }
}

impl core::error::Error for KeyDeserializationError {}

// -----------------------------------------------------------------------------
// DeadEnd

/// The sentinel a segment handler returns when traversal cannot proceed.
///
/// The walker converts it at the boundary: to `None`/`false` in suppress
/// mode, to a [`PathWalkerError`] otherwise. Errors never travel through
/// the hot traversal path itself.
#[derive(Debug)]
pub(crate) struct DeadEnd {
    code: ErrorCode,
    segment: usize,
    message: String,
}

impl DeadEnd {
    pub(crate) fn null_value(segment: usize) -> Self {
        Self {
            code: ErrorCode::NullValue,
            segment,
            message: String::from("descended into a null value"),
        }
    }

    pub(crate) fn no_such_key(segment: usize, key: String) -> Self {
        Self {
            code: ErrorCode::NoSuchKey,
            segment,
            message: format!("no such key: {key}"),
        }
    }

    pub(crate) fn no_such_property(segment: usize, type_name: &str, property: &str) -> Self {
        Self {
            code: ErrorCode::NoSuchProperty,
            segment,
            message: format!("no such property: {type_name}.{property}"),
        }
    }

    pub(crate) fn index_expected(segment: usize, found: Option<&str>) -> Self {
        Self {
            code: ErrorCode::IndexExpected,
            segment,
            message: match found {
                Some(s) => format!("array index expected, found \"{s}\""),
                None => String::from("array index expected, found the null key"),
            },
        }
    }

    pub(crate) fn index_out_of_bounds(segment: usize, index: usize, len: usize) -> Self {
        Self {
            code: ErrorCode::IndexOutOfBounds,
            segment,
            message: format!("index {index} out of bounds for length {len}"),
        }
    }

    pub(crate) fn empty_segment(segment: usize) -> Self {
        Self {
            code: ErrorCode::EmptySegment,
            segment,
            message: String::from("empty segment applied to a record"),
        }
    }

    pub(crate) fn terminal_value(segment: usize, type_name: &str) -> Self {
        Self {
            code: ErrorCode::TerminalValue,
            segment,
            message: format!("cannot continue past terminal value of type {type_name}"),
        }
    }

    pub(crate) fn type_mismatch(segment: usize, message: String) -> Self {
        Self {
            code: ErrorCode::TypeMismatch,
            segment,
            message,
        }
    }

    pub(crate) fn not_modifiable(segment: usize, type_name: &str) -> Self {
        Self {
            code: ErrorCode::NotModifiable,
            segment,
            message: format!("{type_name} rejects modification"),
        }
    }

    pub(crate) fn key_deserialization_failed(
        segment: usize,
        error: &KeyDeserializationError,
    ) -> Self {
        Self {
            code: ErrorCode::KeyDeserializationFailed,
            segment,
            message: format!("{error}"),
        }
    }

    pub(crate) fn exception(segment: usize, message: String) -> Self {
        Self {
            code: ErrorCode::Exception,
            segment,
            message,
        }
    }

    pub(crate) fn into_error(self, path: &Path) -> PathWalkerError {
        PathWalkerError {
            code: self.code,
            path: path.clone(),
            segment: self.segment,
            message: self.message,
        }
    }
}
