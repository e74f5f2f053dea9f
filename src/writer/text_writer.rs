//! Streaming implementation of the cursor-style [`TextWriter`]

use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::*;
use crate::json_number::is_valid_json_number;
use crate::reader::NodeType;
use crate::utf8;

/// A cursor-style JSON writer which emits data to a [`Write`]
///
/// The writer mirrors the reader's state machine: a stack of open containers, a per-level
/// element counter deciding whether a comma is required before the next element, and an
/// `intermediate` flag which is true exactly while an object member's name has been
/// written but its value has not. All delimiters (commas, colons, brackets) are emitted by
/// the writer itself; a sequence of calls which would produce syntactically invalid JSON
/// is rejected with a [`WriterError::Node`] instead.
///
/// Member names are always written as quoted strings; scalar non-string names (numbers,
/// booleans, `null`) are quoted automatically.
///
/// The writer does not buffer internally; wrap the provided writer in a
/// [`std::io::BufWriter`] when writing to a file or network connection, or use
/// [`TextWriter::create`] which already does.
pub struct TextWriter<W: Write> {
    writer: W,
    /// Currently open containers; the length of this stack is the nesting depth
    stack: Vec<NodeType>,
    /// Number of elements written so far at each open level, parallel to [`stack`](Self::stack)
    counts: Vec<u64>,
    /// Whether an object member's name awaits its value
    intermediate: bool,
    /// Whether the top-level value has been written (or started)
    root_written: bool,

    settings: WriterSettings,
}

impl<W: Write + Debug> Debug for TextWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextWriter")
            .field("writer", &self.writer)
            .field("stack", &self.stack)
            .field("counts", &self.counts)
            .field("intermediate", &self.intermediate)
            .field("root_written", &self.root_written)
            .field("settings", &self.settings)
            .finish()
    }
}

/// A writer emitting to a file, see [`TextWriter::create`]
pub type FileTextWriter = TextWriter<BufWriter<File>>;

/// A writer emitting to an in-memory string, see [`TextWriter::as_str`]
pub type StringTextWriter = TextWriter<Vec<u8>>;

impl TextWriter<BufWriter<File>> {
    /// Creates the file at `path`, truncating any existing file, and writes to it
    ///
    /// The output is buffered; call [`into_inner`](TextWriter::into_inner) and flush once
    /// the document is complete.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl TextWriter<Vec<u8>> {
    /// The document written so far
    pub fn as_str(&self) -> &str {
        // The writer only ever emits valid UTF-8 data
        utf8::to_str_unchecked(&self.writer)
    }

    /// Consumes the writer, returning the written document
    pub fn into_string(self) -> String {
        utf8::to_string_unchecked(self.writer)
    }
}

impl Default for TextWriter<Vec<u8>> {
    /// Creates a writer over a new in-memory string sink
    fn default() -> Self {
        TextWriter::new(Vec::new())
    }
}

// Implementation with public constructor methods
impl<W: Write> TextWriter<W> {
    /// Creates a JSON writer with [default settings](WriterSettings::default)
    pub fn new(writer: W) -> Self {
        TextWriter::new_custom(writer, WriterSettings::default())
    }

    /// Creates a JSON writer with custom settings
    ///
    /// The settings can be used to customize how the JSON output will look like.
    pub fn new_custom(writer: W, settings: WriterSettings) -> Self {
        Self {
            writer,
            stack: Vec::with_capacity(16),
            counts: Vec::with_capacity(16),
            intermediate: false,
            root_written: false,
            settings,
        }
    }

    /// Unwrap the inner writer
    ///
    /// The caller is responsible for flushing buffered writers; this writer itself does
    /// not buffer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

// Implementation with JSON structure state inspection methods
impl<W: Write> TextWriter<W> {
    /// Number of currently open, not yet closed containers
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether at least one container is currently open
    pub fn is_valid(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Whether the current container is an array
    pub fn is_array(&self) -> bool {
        self.stack.last() == Some(&NodeType::Array)
    }

    /// Whether the current container is an object
    pub fn is_object(&self) -> bool {
        self.stack.last() == Some(&NodeType::Object)
    }

    fn node_error<T>(&self, kind: NodeErrorKind) -> Result<T, WriterError> {
        Err(WriterError::Node(kind))
    }
}

// Implementation with low level emission methods
impl<W: Write> TextWriter<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        // write_all retries on `ErrorKind::Interrupted`, as desired
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn write_indentation(&mut self) -> Result<(), WriterError> {
        let indent = match &self.settings.style {
            WriteStyle::Compact => return Ok(()),
            WriteStyle::Pretty { indent } => indent.clone(),
        };
        self.write_bytes(b"\n")?;
        for _ in 0..self.stack.len() {
            self.write_bytes(indent.as_bytes())?;
        }
        Ok(())
    }

    /// Emits the delimiter for a new element at the current level and counts it
    ///
    /// Inside an object this runs when the member *name* is written; the member's value
    /// follows the colon without further delimiters, so a pair is counted exactly once.
    fn before_element(&mut self) -> Result<(), WriterError> {
        if let Some(count) = self.counts.last().copied() {
            if count != 0 {
                self.write_bytes(b",")?;
            }
            self.write_indentation()?;
            if let Some(count) = self.counts.last_mut() {
                *count += 1;
            }
        }
        Ok(())
    }

    /// Verifies that a value may be written in the current state
    fn check_value_position(&self) -> Result<(), WriterError> {
        match self.stack.last() {
            Some(NodeType::Object) if !self.intermediate => {
                self.node_error(NodeErrorKind::ExpectingKey)
            }
            Some(_) => Ok(()),
            None if self.root_written => self.node_error(NodeErrorKind::DocumentComplete),
            None => Ok(()),
        }
    }

    /// Delimiter and state bookkeeping before a value (or container start) is emitted
    fn before_value(&mut self) -> Result<(), WriterError> {
        match self.stack.last() {
            Some(NodeType::Array) => self.before_element()?,
            // Inside an object the delimiters were emitted along with the member name
            Some(NodeType::Object) => debug_assert!(self.intermediate),
            None => self.root_written = true,
        }
        self.intermediate = false;
        Ok(())
    }
}

// Implementation with the container methods
impl<W: Write> TextWriter<W> {
    fn start_container(&mut self, node: NodeType) -> Result<(), WriterError> {
        self.check_value_position()?;
        self.before_value()?;
        self.write_bytes(match node {
            NodeType::Array => b"[",
            NodeType::Object => b"{",
        })?;
        self.stack.push(node);
        self.counts.push(0);
        Ok(())
    }

    fn end_container(&mut self, node: NodeType) -> Result<(), WriterError> {
        if self.stack.last() != Some(&node) {
            return self.node_error(NodeErrorKind::MismatchedNode);
        }
        if self.intermediate {
            return self.node_error(NodeErrorKind::DanglingKey);
        }
        let count = self.counts.pop().unwrap_or(0);
        self.stack.pop();
        if count != 0 {
            self.write_indentation()?;
        }
        self.write_bytes(match node {
            NodeType::Array => b"]",
            NodeType::Object => b"}",
        })
    }

    /// Opens an array
    ///
    /// Permitted at the empty root, inside an array, or as an object member's value
    /// directly after its name.
    pub fn start_array(&mut self) -> Result<(), WriterError> {
        self.start_container(NodeType::Array)
    }

    /// Closes the current array
    ///
    /// # Errors
    /// A [`NodeErrorKind::MismatchedNode`] when the current container is not an array.
    pub fn end_array(&mut self) -> Result<(), WriterError> {
        self.end_container(NodeType::Array)
    }

    /// Opens an object
    ///
    /// Permitted at the empty root, inside an array, or as an object member's value
    /// directly after its name.
    pub fn start_object(&mut self) -> Result<(), WriterError> {
        self.start_container(NodeType::Object)
    }

    /// Closes the current object
    ///
    /// # Errors
    /// A [`NodeErrorKind::MismatchedNode`] when the current container is not an object, or
    /// a [`NodeErrorKind::DanglingKey`] when a member name awaits its value.
    pub fn end_object(&mut self) -> Result<(), WriterError> {
        self.end_container(NodeType::Object)
    }
}

// Implementation with the write methods
impl<W: Write> TextWriter<W> {
    /// Writes a member name
    ///
    /// Scalar non-string names are quoted automatically; `writer.write_key(1)?` emits
    /// `"1"`. Afterwards the member's value must be supplied with
    /// [`write_value`](Self::write_value) (or a container started in its place).
    ///
    /// # Errors
    /// A [`NodeErrorKind::KeyOutsideObject`] when the current container is not an object,
    /// a [`NodeErrorKind::ExpectingValue`] when the previous name awaits its value, and a
    /// [`NodeErrorKind::ContainerAsKey`] for array or object names.
    pub fn write_key(&mut self, key: impl Into<Value>) -> Result<(), WriterError> {
        if !self.is_object() {
            return self.node_error(NodeErrorKind::KeyOutsideObject);
        }
        if self.intermediate {
            return self.node_error(NodeErrorKind::ExpectingValue);
        }
        let key = key.into();
        if key.is_container() {
            return self.node_error(NodeErrorKind::ContainerAsKey);
        }

        self.before_element()?;
        self.write_quoted_scalar(&key)?;
        self.write_bytes(match self.settings.style {
            WriteStyle::Compact => b":".as_slice(),
            WriteStyle::Pretty { .. } => b": ".as_slice(),
        })?;
        self.intermediate = true;
        Ok(())
    }

    /// Writes a value
    ///
    /// Permitted at the empty root, inside an array, or as an object member's value
    /// directly after its name. Containers are written recursively through the same state
    /// machine, so nesting, delimiters and pretty printing behave as if the container had
    /// been written element by element.
    ///
    /// # Errors
    /// A [`NodeErrorKind::ExpectingKey`] when an object member's name is required instead,
    /// and a [`NodeErrorKind::DocumentComplete`] for a second top-level value.
    pub fn write_value(&mut self, value: impl Into<Value>) -> Result<(), WriterError> {
        match value.into() {
            Value::Array(items) => {
                self.start_array()?;
                for item in items {
                    self.write_value(item)?;
                }
                self.end_array()
            }
            Value::Object(members) => {
                self.start_object()?;
                for (key, value) in members {
                    self.write_key(key)?;
                    self.write_value(value)?;
                }
                self.end_object()
            }
            scalar => {
                self.check_value_position()?;
                self.before_value()?;
                self.write_scalar(&scalar)
            }
        }
    }

    /// Writes a member name or a value, decided by the writer's current state
    ///
    /// Inside an object this call is contextually a name when none is pending and a value
    /// otherwise, so successive calls alternate between the two roles. Inside an array and
    /// at the empty root it is always a value.
    pub fn write(&mut self, value: impl Into<Value>) -> Result<(), WriterError> {
        if self.is_object() && !self.intermediate {
            self.write_key(value)
        } else {
            self.write_value(value)
        }
    }

    /// Writes a member name and its value in one call
    pub fn write_pair(
        &mut self,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<(), WriterError> {
        self.write_key(key)?;
        self.write_value(value)
    }
}

// Implementation with scalar formatting methods
impl<W: Write> TextWriter<W> {
    fn float_string(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_owned();
        }
        if value.is_infinite() {
            let spelling = match (self.settings.infinity, value > 0.0) {
                (InfinitySpelling::Inf, true) => "inf",
                (InfinitySpelling::Inf, false) => "-inf",
                (InfinitySpelling::Infinity, true) => "Infinity",
                (InfinitySpelling::Infinity, false) => "-Infinity",
            };
            return spelling.to_owned();
        }
        let string = value.to_string();
        debug_assert!(
            is_valid_json_number(&string),
            "Unexpected: not a valid JSON number: {string}"
        );
        string
    }

    /// Emits one scalar value; containers are handled by [`write_value`](Self::write_value)
    fn write_scalar(&mut self, value: &Value) -> Result<(), WriterError> {
        match value {
            Value::Null => self.write_bytes(b"null"),
            Value::Bool(true) => self.write_bytes(b"true"),
            Value::Bool(false) => self.write_bytes(b"false"),
            Value::Int(number) => {
                let string = number.to_string();
                self.write_bytes(string.as_bytes())
            }
            Value::UInt(number) => {
                let string = number.to_string();
                self.write_bytes(string.as_bytes())
            }
            Value::Float(number) => {
                let string = self.float_string(*number);
                self.write_bytes(string.as_bytes())
            }
            Value::Str(string) => self.write_string_value(string),
            Value::Array(_) | Value::Object(_) => {
                unreachable!("containers are dispatched before scalar emission")
            }
        }
    }

    /// Emits a scalar as a member name; non-string scalars are quoted
    fn write_quoted_scalar(&mut self, key: &Value) -> Result<(), WriterError> {
        match key {
            Value::Str(_) => self.write_scalar(key),
            _ => {
                self.write_bytes(b"\"")?;
                self.write_scalar(key)?;
                self.write_bytes(b"\"")
            }
        }
    }
}

// Implementation with string escaping methods
impl<W: Write> TextWriter<W> {
    fn should_escape(c: char) -> bool {
        // Control characters must be escaped per JSON specification
        matches!(c, '"' | '\\') || matches!(c, '\u{0}'..='\u{1F}')
    }

    fn write_escaped_char(&mut self, c: char) -> Result<(), WriterError> {
        fn to_hex(i: u32) -> u8 {
            match i {
                0..=9 => b'0' + i as u8,
                10..=15 => b'A' + (i - 10) as u8,
                _ => unreachable!("Unexpected value {i}"),
            }
        }

        let escape = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{0008}' => "\\b",
            '\u{000C}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            _ => {
                // Remaining escaped chars are control chars in the range 0x00..=0x1F
                let value = c as u32;
                debug_assert!(value <= 0x1F);
                let unicode_escape = [
                    b'\\',
                    b'u',
                    to_hex(value >> 12 & 15),
                    to_hex(value >> 8 & 15),
                    to_hex(value >> 4 & 15),
                    to_hex(value & 15),
                ];
                return self.write_bytes(&unicode_escape);
            }
        };
        self.write_bytes(escape.as_bytes())
    }

    fn write_string_value(&mut self, value: &str) -> Result<(), WriterError> {
        self.write_bytes(b"\"")?;

        let bytes = value.as_bytes();
        let mut next_to_write_index = 0;
        for (index, char) in value.char_indices() {
            if Self::should_escape(char) {
                if index > next_to_write_index {
                    self.write_bytes(&bytes[next_to_write_index..index])?;
                }
                self.write_escaped_char(char)?;
                next_to_write_index = index + char.len_utf8();
            }
        }
        // Write remaining unescaped bytes
        if next_to_write_index < bytes.len() {
            self.write_bytes(&bytes[next_to_write_index..])?;
        }

        self.write_bytes(b"\"")
    }
}
