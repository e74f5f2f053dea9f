//! Module for writing JSON data
//!
//! [`TextWriter`] is the push-based streaming writer mirroring the reader's state machine:
//! a stack of open containers, a per-level element counter deciding where commas go, and
//! an `intermediate` flag which is true exactly between writing an object member's name
//! and its value. [`Value`] is the closed set of writable values.

use duplicate::duplicate_item;
use thiserror::Error;

mod text_writer;
// Re-export streaming implementation under `writer` module
pub use text_writer::*;

type IoError = std::io::Error;

/// Describes why a write call is not permitted in the writer's current state
#[non_exhaustive]
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum NodeErrorKind {
    /// The closing bracket does not match the currently open container, or no container is open
    MismatchedNode,
    /// An object was closed while a member name awaits its value
    DanglingKey,
    /// A member name was written while the previous member name awaits its value
    ExpectingValue,
    /// A member value was written where a member name is required
    ExpectingKey,
    /// A member name was written while the current container is not an object
    KeyOutsideObject,
    /// An array or object was used as a member name
    ContainerAsKey,
    /// A second top-level value was written
    DocumentComplete,
}

/// Error which occurred while writing to a JSON writer
///
/// After an error the writer's output and internal state are unspecified; further write
/// calls on the same writer instance must not be expected to produce a consistent
/// document.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WriterError {
    /// The call is not permitted in the writer's current state
    #[error("node error: {0}")]
    Node(NodeErrorKind),
    /// An IO error occurred while writing to the underlying writer
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

/// Spelling used for non-finite numbers in the output
///
/// The reader accepts both spellings; the writer picks one. `NaN` is always spelled `NaN`.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum InfinitySpelling {
    /// Write `inf` and `-inf`
    Inf,
    /// Write `Infinity` and `-Infinity`
    Infinity,
}

/// Formatting style for the JSON output
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum WriteStyle {
    /// No whitespace between tokens
    Compact,
    /// Line breaks between elements and nested containers indented by repeating `indent`
    Pretty {
        /// The string written once per nesting level in front of each element
        indent: String,
    },
}

/// Settings to customize the JSON writer behavior
///
/// These settings are used by [`TextWriter::new_custom`]. To avoid repeating the default
/// values for unchanged settings `..Default::default()` can be used:
/// ```
/// # use curson::writer::*;
/// WriterSettings {
///     style: WriteStyle::Pretty { indent: "  ".to_owned() },
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct WriterSettings {
    /// Formatting style of the output
    ///
    /// This only affects how the JSON output looks, not its data; all compliant JSON
    /// readers should consider compact and pretty output identical.
    pub style: WriteStyle,
    /// Spelling used for non-finite numbers
    pub infinity: InfinitySpelling,
}

impl Default for WriterSettings {
    /// Creates the default JSON writer settings
    ///
    /// - style: compact (no whitespace)
    /// - infinity spelling: `inf` / `-inf`
    fn default() -> Self {
        WriterSettings {
            style: WriteStyle::Compact,
            infinity: InfinitySpelling::Inf,
        }
    }
}

/// A writable JSON value
///
/// This closed set of variants is the writer's dispatch point: the role and formatting of
/// a written value is decided by matching on the variant instead of by overload
/// resolution. The `From` conversions allow passing plain Rust values to the write
/// methods directly, for example `writer.write_value(1)?` or
/// `writer.write_value(vec![1, 2])?`.
#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    /// JSON `null`
    Null,
    /// JSON boolean value
    Bool(bool),
    /// JSON number value holding a signed integer
    Int(i64),
    /// JSON number value holding an unsigned integer beyond the `i64` range
    UInt(u64),
    /// JSON number value holding a floating point number
    ///
    /// Non-finite values are permitted; they are written as `NaN` and the
    /// [configured infinity spelling](WriterSettings::infinity).
    Float(f64),
    /// JSON string value
    Str(String),
    /// JSON array; the elements are written in order
    Array(Vec<Value>),
    /// JSON object; the members are written in insertion order
    ///
    /// Member names may be any scalar variant and are always written as quoted strings;
    /// using a container as member name is a [`NodeErrorKind::ContainerAsKey`] error.
    Object(Vec<(Value, Value)>),
}

impl Value {
    /// Whether this value is an array or object
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

// Use `duplicate` crate to avoid repeating code for all supported types, see https://stackoverflow.com/a/61467564
#[duplicate_item(type_template; [i8]; [i16]; [i32]; [i64]; [u8]; [u16]; [u32])]
impl From<type_template> for Value {
    fn from(v: type_template) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::UInt(v as u64)
    }
}

#[duplicate_item(type_template; [f32]; [f64])]
impl From<type_template> for Value {
    fn from(v: type_template) -> Self {
        Value::Float(f64::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}
