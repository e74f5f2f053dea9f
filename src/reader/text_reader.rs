//! Streaming implementation of the cursor-style [`TextReader`]

use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::*;
use crate::extract::{ExtractError, FromJsonText};
use crate::json_number::is_valid_json_number;
use crate::utf8;

const READER_BUF_SIZE: usize = 1024;
const INITIAL_TEXT_BUF_CAPACITY: usize = 128;

/// Settings to customize the JSON reader behavior
///
/// These settings are used by [`TextReader::new_custom`]. To avoid repeating the
/// default values for unchanged settings `..Default::default()` can be used:
/// ```
/// # use curson::reader::ReaderSettings;
/// ReaderSettings {
///     allow_control_chars: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct ReaderSettings {
    /// Whether to allow unescaped control characters in member names and string values
    ///
    /// The JSON specification requires that Unicode characters in the range from `0x00`
    /// to `0x1F` (inclusive) are escaped when part of a member name or string value,
    /// either as `\uXXXX` escape or as short escape sequence such as `\n`. When this
    /// setting is enabled such characters are admitted verbatim instead.
    pub allow_control_chars: bool,
}

impl Default for ReaderSettings {
    /// Creates the default JSON reader settings
    ///
    /// - unescaped control characters: disallowed
    ///
    /// These defaults are compliant with the JSON specification.
    fn default() -> Self {
        ReaderSettings {
            allow_control_chars: false,
        }
    }
}

/// A cursor-style JSON reader which consumes data from a [`Read`]
///
/// The reader is a single-pass state machine: [`read`](Self::read) advances the cursor by
/// exactly one token and updates the cursor state, which the query methods (such as
/// [`depth`](Self::depth), [`value_type`](Self::value_type), [`has_key`](Self::has_key))
/// report without side effects. No document tree is ever materialized; the only
/// per-document storage is the container stack and the text of the most recently parsed
/// member name and value, both of which are overwritten by every step.
///
/// The reader internally buffers data so it is normally not necessary to wrap the provided
/// reader in a [`std::io::BufReader`]. The data is expected to be valid UTF-8; malformed
/// UTF-8 data in string content is reported as [`LexicalErrorKind::InvalidUtf8`].
///
/// If the underlying reader returns an error of kind [`ErrorKind::Interrupted`], this
/// JSON reader will keep retrying to read data.
///
/// Construction already consumes the first token of the document: for a document starting
/// with `{` or `[` the cursor is positioned on the corresponding start event; any other
/// document is parsed as a single bare top-level value (RFC 7159) which may be followed by
/// whitespace only.
///
/// # Security
/// This reader does not impose a limit on the length of the document, on the nesting
/// depth, or on the length of member names and string values, and it does not detect
/// duplicate member names. When processing JSON data from an untrusted source, users must
/// implement protections against these issues themselves. The reader itself uses no
/// recursion and only bounds-checked buffer access, so malformed input of any shape is
/// rejected with an error instead of causing memory unsafety.
pub struct TextReader<R: Read> {
    reader: R,
    /// Buffer containing some bytes read from [`reader`](Self::reader)
    buf: [u8; READER_BUF_SIZE],
    /// Start index (inclusive) at which unprocessed data in [`buf`](Self::buf) starts
    buf_pos: usize,
    /// Index (exclusive) up to which [`buf`](Self::buf) is filled
    buf_end_pos: usize,
    reached_eof: bool,
    byte_pos: u64,

    /// Currently open containers; the length of this stack is the nesting depth
    stack: Vec<NodeType>,
    /// Number of elements parsed so far at each open level, parallel to [`stack`](Self::stack)
    ///
    /// A counter is 0 only while its container has just been opened; the counter decides
    /// whether a comma is required (nonzero) or forbidden (zero) before the next element.
    counts: Vec<u64>,
    /// Decoded text of the most recently parsed member name
    key_buf: Vec<u8>,
    /// Decoded text of the most recently parsed value token
    value_buf: Vec<u8>,
    value_type: ValueType,
    /// Whether a member name was parsed in the current step
    has_key: bool,
    /// Latched once any error was raised; the reader is unusable afterwards
    failed: bool,
    /// Latched for stream-level failures, see [`is_bad`](Self::is_bad)
    bad: bool,

    settings: ReaderSettings,
}

impl<R: Read + Debug> Debug for TextReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextReader")
            .field("reader", &self.reader)
            .field("stack", &self.stack)
            .field("counts", &self.counts)
            .field("value_type", &self.value_type)
            .field("key", &utf8::to_str_unchecked(&self.key_buf))
            .field("value", &utf8::to_str_unchecked(&self.value_buf))
            .field("has_key", &self.has_key)
            .field("failed", &self.failed)
            .field("byte_pos", &self.byte_pos)
            .finish()
    }
}

/// A reader over a file, see [`TextReader::open`]
pub type FileTextReader = TextReader<BufReader<File>>;

/// A reader over in-memory text, see [`TextReader::from_str`]
pub type StringTextReader<'a> = TextReader<&'a [u8]>;

impl TextReader<BufReader<File>> {
    /// Opens the file at `path` and creates a reader over its content
    ///
    /// The file is read in binary mode; its content must be UTF-8 encoded JSON text.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let file = File::open(path).map_err(|error| ReaderError::Io { error, pos: 0 })?;
        Self::new(BufReader::new(file))
    }
}

impl<'a> TextReader<&'a [u8]> {
    /// Creates a reader over in-memory JSON text
    pub fn from_str(json: &'a str) -> Result<Self, ReaderError> {
        Self::new(json.as_bytes())
    }
}

// Implementation with public constructor methods
impl<R: Read> TextReader<R> {
    /// Creates a JSON reader with [default settings](ReaderSettings::default)
    ///
    /// This already consumes the first token of the document, see the struct documentation.
    ///
    /// # Errors
    /// An empty document, a malformed first token and trailing data after a bare top-level
    /// value are reported here instead of at the first [`read`](Self::read) call.
    pub fn new(reader: R) -> Result<Self, ReaderError> {
        TextReader::new_custom(reader, ReaderSettings::default())
    }

    /// Creates a JSON reader with custom settings
    pub fn new_custom(reader: R, settings: ReaderSettings) -> Result<Self, ReaderError> {
        let initial_nesting_capacity = 16;
        let mut json_reader = Self {
            reader,
            buf: [0; READER_BUF_SIZE],
            buf_pos: 0,
            buf_end_pos: 0,
            reached_eof: false,
            byte_pos: 0,
            stack: Vec::with_capacity(initial_nesting_capacity),
            counts: Vec::with_capacity(initial_nesting_capacity),
            key_buf: Vec::with_capacity(INITIAL_TEXT_BUF_CAPACITY),
            value_buf: Vec::with_capacity(INITIAL_TEXT_BUF_CAPACITY),
            value_type: ValueType::Null,
            has_key: false,
            failed: false,
            bad: false,
            settings,
        };
        match json_reader.read_start() {
            Ok(()) => Ok(json_reader),
            Err(e) => {
                json_reader.mark_failed(&e);
                Err(e)
            }
        }
    }
}

// Implementation with low level byte reading methods
impl<R: Read> TextReader<R> {
    /// Fills the buffer; returns `false` if the end of the input has been reached
    fn fill_buffer(&mut self) -> Result<bool, ReaderError> {
        if self.reached_eof {
            return Ok(false);
        }
        debug_assert!(self.buf_pos >= self.buf_end_pos);

        self.buf_pos = 0;
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(read_bytes_count) => {
                    self.buf_end_pos = read_bytes_count;
                    break;
                }
                // Retry if interrupted
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(error) => {
                    return Err(ReaderError::Io {
                        error,
                        pos: self.byte_pos,
                    })
                }
            }
        }
        if self.buf_end_pos == 0 {
            self.reached_eof = true;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    /// Peeks at the next byte without consuming it
    ///
    /// Returns `None` if the end of the input has been reached.
    fn peek_byte(&mut self) -> Result<Option<u8>, ReaderError> {
        if self.buf_pos < self.buf_end_pos || self.fill_buffer()? {
            Ok(Some(self.buf[self.buf_pos]))
        } else {
            Ok(None)
        }
    }

    /// Skips the last byte returned by [`peek_byte`](Self::peek_byte)
    fn skip_peeked_byte(&mut self) {
        debug_assert!(self.buf_pos < self.buf_end_pos);
        self.buf_pos += 1;
        self.byte_pos += 1;
    }

    /// Reads the next byte; the end of the input is an [`ReaderError::UnexpectedEnd`]
    fn read_byte(&mut self) -> Result<u8, ReaderError> {
        match self.peek_byte()? {
            Some(b) => {
                self.skip_peeked_byte();
                Ok(b)
            }
            None => Err(ReaderError::UnexpectedEnd { pos: self.byte_pos }),
        }
    }

    /// Reads the next byte; the end of the input is a lexical error of the given kind
    fn read_byte_or(&mut self, eof_error_kind: LexicalErrorKind) -> Result<u8, ReaderError> {
        match self.peek_byte()? {
            Some(b) => {
                self.skip_peeked_byte();
                Ok(b)
            }
            None => Err(ReaderError::Lexical {
                kind: eof_error_kind,
                pos: self.byte_pos,
            }),
        }
    }

    /// Skips whitespace and peeks at the first byte after it
    fn skip_whitespace(&mut self) -> Result<Option<u8>, ReaderError> {
        while let Some(byte) = self.peek_byte()? {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => self.skip_peeked_byte(),
                _ => return Ok(Some(byte)),
            }
        }
        Ok(None)
    }
}

// Implementation with error utility methods
impl<R: Read> TextReader<R> {
    fn structural_error<T>(&self, kind: StructuralErrorKind) -> Result<T, ReaderError> {
        Err(ReaderError::Structural {
            kind,
            pos: self.byte_pos,
        })
    }

    fn lexical_error<T>(&self, kind: LexicalErrorKind, pos: u64) -> Result<T, ReaderError> {
        Err(ReaderError::Lexical { kind, pos })
    }

    fn mark_failed(&mut self, error: &ReaderError) {
        self.failed = true;
        if let ReaderError::Io { .. } = error {
            self.bad = true;
        }
    }
}

// Implementation with the parse state machine
impl<R: Read> TextReader<R> {
    /// Parses the first token of the document
    fn read_start(&mut self) -> Result<(), ReaderError> {
        let byte = match self.skip_whitespace()? {
            None => return self.structural_error(StructuralErrorKind::EmptyDocument),
            Some(byte) => byte,
        };
        match byte {
            b'{' => {
                self.skip_peeked_byte();
                self.start_container(NodeType::Object);
            }
            b'[' => {
                self.skip_peeked_byte();
                self.start_container(NodeType::Array);
            }
            _ => {
                // No root container; RFC 7159 permits a bare top-level value, which must
                // be followed by trailing whitespace only
                self.parse_value(byte)?;
                if self.skip_whitespace()?.is_some() {
                    return self.structural_error(StructuralErrorKind::TrailingData);
                }
            }
        }
        Ok(())
    }

    /// Advances the cursor by exactly one token
    ///
    /// Returns `true` if a token was parsed. Once the reader is no longer
    /// [valid](Self::is_valid) — because the document has been fully consumed or because an
    /// error was raised earlier — this is a no-op returning `false`.
    ///
    /// # Errors
    /// Any grammar violation or stream failure is raised here and permanently invalidates
    /// the reader, see [`ReaderError`].
    pub fn read(&mut self) -> Result<bool, ReaderError> {
        if !self.is_valid() {
            return Ok(false);
        }
        match self.read_token() {
            Ok(()) => Ok(true),
            Err(e) => {
                self.mark_failed(&e);
                Err(e)
            }
        }
    }

    fn read_token(&mut self) -> Result<(), ReaderError> {
        self.key_buf.clear();
        self.value_buf.clear();
        self.has_key = false;

        let byte = match self.skip_whitespace()? {
            Some(byte) => byte,
            // End of input while the container stack is non-empty
            None => return Err(ReaderError::UnexpectedEnd { pos: self.byte_pos }),
        };

        match self.stack.last() {
            Some(NodeType::Array) => self.parse_array_step(byte),
            Some(NodeType::Object) => self.parse_object_step(byte),
            None => unreachable!("read() verified that a container is open"),
        }
    }

    /// Parses the next element, separator or end of the current array
    fn parse_array_step(&mut self, byte: u8) -> Result<(), ReaderError> {
        let count = self.counts.last().copied().unwrap_or(0);
        match byte {
            b',' => {
                if count == 0 {
                    return self.structural_error(StructuralErrorKind::UnexpectedComma);
                }
                self.skip_peeked_byte();
                match self.skip_whitespace()? {
                    Some(byte) => self.parse_value(byte),
                    None => Err(ReaderError::UnexpectedEnd { pos: self.byte_pos }),
                }
            }
            b']' => {
                self.skip_peeked_byte();
                self.end_container(NodeType::Array);
                Ok(())
            }
            _ => {
                // Only the first element may appear without a preceding comma
                if count != 0 {
                    return self.structural_error(StructuralErrorKind::MissingComma);
                }
                self.parse_value(byte)
            }
        }
    }

    /// Parses the next member, separator or end of the current object
    fn parse_object_step(&mut self, byte: u8) -> Result<(), ReaderError> {
        let count = self.counts.last().copied().unwrap_or(0);
        match byte {
            b',' => {
                if count == 0 {
                    return self.structural_error(StructuralErrorKind::UnexpectedComma);
                }
                self.skip_peeked_byte();
                match self.skip_whitespace()? {
                    Some(byte) => self.parse_member(byte),
                    None => Err(ReaderError::UnexpectedEnd { pos: self.byte_pos }),
                }
            }
            b'}' => {
                self.skip_peeked_byte();
                self.end_container(NodeType::Object);
                Ok(())
            }
            b']' => self.structural_error(StructuralErrorKind::UnexpectedClosingBracket),
            _ => {
                if count != 0 {
                    return self.structural_error(StructuralErrorKind::MissingComma);
                }
                self.parse_member(byte)
            }
        }
    }

    /// Parses one `"name": value` pair
    fn parse_member(&mut self, byte: u8) -> Result<(), ReaderError> {
        if byte != b'"' {
            return self.structural_error(StructuralErrorKind::ExpectingMemberName);
        }
        self.parse_string(true)?;
        self.has_key = true;

        match self.skip_whitespace()? {
            Some(b':') => self.skip_peeked_byte(),
            Some(_) => return self.structural_error(StructuralErrorKind::MissingColon),
            None => return Err(ReaderError::UnexpectedEnd { pos: self.byte_pos }),
        }
        match self.skip_whitespace()? {
            Some(byte) => self.parse_value(byte),
            None => Err(ReaderError::UnexpectedEnd { pos: self.byte_pos }),
        }
    }

    /// Parses one value token, dispatching on the peeked first byte
    ///
    /// A `{` or `[` pushes a new container level instead of completing a scalar; callers
    /// observe the open as one step and must call [`read`](Self::read) again to consume the
    /// new level's children.
    fn parse_value(&mut self, byte: u8) -> Result<(), ReaderError> {
        match byte {
            b'}' | b']' => self.structural_error(StructuralErrorKind::UnexpectedClosingBracket),
            b',' => self.structural_error(StructuralErrorKind::UnexpectedComma),
            b':' => self.structural_error(StructuralErrorKind::UnexpectedColon),
            b'{' => {
                self.skip_peeked_byte();
                self.start_container(NodeType::Object);
                Ok(())
            }
            b'[' => {
                self.skip_peeked_byte();
                self.start_container(NodeType::Array);
                Ok(())
            }
            b'"' => {
                self.parse_string(false)?;
                self.value_type = ValueType::String;
                self.on_value_end();
                Ok(())
            }
            b'n' => self.parse_keyword("null", ValueType::Null),
            b't' => self.parse_keyword("true", ValueType::Boolean),
            b'f' => self.parse_keyword("false", ValueType::Boolean),
            b'N' => self.parse_keyword("NaN", ValueType::Number),
            b'i' => self.parse_keyword("inf", ValueType::Number),
            b'I' => self.parse_keyword("Infinity", ValueType::Number),
            _ => self.parse_number(byte),
        }
    }

    fn start_container(&mut self, node: NodeType) {
        self.value_type = match node {
            NodeType::Array => ValueType::ArrayStart,
            NodeType::Object => ValueType::ObjectStart,
        };
        self.stack.push(node);
        self.counts.push(0);
    }

    fn end_container(&mut self, node: NodeType) {
        debug_assert!(self.stack.last() == Some(&node));
        self.value_type = match node {
            NodeType::Array => ValueType::ArrayEnd,
            NodeType::Object => ValueType::ObjectEnd,
        };
        self.stack.pop();
        self.counts.pop();
        // The closed container is one parsed element of its parent
        if let Some(count) = self.counts.last_mut() {
            *count += 1;
        }
    }

    /// Bookkeeping after a scalar value was parsed
    fn on_value_end(&mut self) {
        if let Some(count) = self.counts.last_mut() {
            *count += 1;
        }
    }

    /// Verifies that the byte may directly follow a literal or number
    ///
    /// This rejects misleading values such as `truey` or `123f`.
    fn verify_value_separator(
        &self,
        byte: u8,
        error_kind: LexicalErrorKind,
        pos: u64,
    ) -> Result<(), ReaderError> {
        match byte {
            // Note: also includes ':' even though that is not a valid value separator, to
            // get more accurate errors for misplaced values
            b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r' | b':' => Ok(()),
            _ => self.lexical_error(error_kind, pos),
        }
    }

    /// Consumes the exact keyword or fails
    fn consume_keyword(&mut self, keyword: &str) -> Result<(), ReaderError> {
        let pos = self.byte_pos;
        for expected_byte in keyword.bytes() {
            let byte = self.read_byte_or(LexicalErrorKind::InvalidLiteral)?;
            if byte != expected_byte {
                return self.lexical_error(LexicalErrorKind::InvalidLiteral, pos);
            }
        }
        if let Some(byte) = self.peek_byte()? {
            self.verify_value_separator(byte, LexicalErrorKind::InvalidLiteral, pos)?;
        }
        Ok(())
    }

    fn parse_keyword(&mut self, keyword: &str, value_type: ValueType) -> Result<(), ReaderError> {
        self.consume_keyword(keyword)?;
        self.value_buf.extend_from_slice(keyword.as_bytes());
        self.value_type = value_type;
        self.on_value_end();
        Ok(())
    }

    /// Parses a number token, or a negative infinity literal
    fn parse_number(&mut self, first_byte: u8) -> Result<(), ReaderError> {
        let pos = self.byte_pos;

        if first_byte == b'-' {
            self.skip_peeked_byte();
            self.value_buf.push(b'-');
            // Negative infinity in either spelling
            if let Some(byte @ (b'i' | b'I')) = self.peek_byte()? {
                let keyword = if byte == b'i' { "inf" } else { "Infinity" };
                self.consume_keyword(keyword)?;
                self.value_buf.extend_from_slice(keyword.as_bytes());
                self.value_type = ValueType::Number;
                self.on_value_end();
                return Ok(());
            }
        }

        loop {
            match self.peek_byte()? {
                Some(byte)
                    if byte.is_ascii_digit()
                        || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-') =>
                {
                    self.skip_peeked_byte();
                    self.value_buf.push(byte);
                }
                Some(byte) => {
                    self.verify_value_separator(byte, LexicalErrorKind::MalformedNumber, pos)?;
                    break;
                }
                None => break,
            }
        }

        // Number tokens consist only of ASCII bytes
        if !is_valid_json_number(utf8::to_str_unchecked(&self.value_buf)) {
            return self.lexical_error(LexicalErrorKind::MalformedNumber, pos);
        }
        self.value_type = ValueType::Number;
        self.on_value_end();
        Ok(())
    }
}

// Implementation with string scanning methods
impl<R: Read> TextReader<R> {
    fn text_buf(&mut self, into_key: bool) -> &mut Vec<u8> {
        if into_key {
            &mut self.key_buf
        } else {
            &mut self.value_buf
        }
    }

    /// Parses one string token into the key or value buffer
    ///
    /// The cursor must be positioned on the opening `"`. Escape sequences are decoded and
    /// raw multi-byte UTF-8 data is validated byte-wise, so the buffer is guaranteed to
    /// hold valid UTF-8 data afterwards.
    fn parse_string(&mut self, into_key: bool) -> Result<(), ReaderError> {
        debug_assert!(self.buf[self.buf_pos] == b'"');
        self.skip_peeked_byte();

        loop {
            let byte = self.read_byte()?;
            match byte {
                b'"' => return Ok(()),
                b'\\' => self.parse_escape(into_key)?,
                0x00..=0x1F => {
                    if self.settings.allow_control_chars {
                        self.text_buf(into_key).push(byte);
                    } else {
                        return self.lexical_error(
                            LexicalErrorKind::ControlCharacterInString,
                            self.byte_pos - 1,
                        );
                    }
                }
                // Non-control ASCII characters
                0x20..=0x7F => self.text_buf(into_key).push(byte),
                // Multi-byte UTF-8 data is validated, then kept verbatim
                _ => self.parse_multibyte(byte, into_key)?,
            }
        }
    }

    /// Parses the remainder of an escape sequence after its `\`
    fn parse_escape(&mut self, into_key: bool) -> Result<(), ReaderError> {
        let pos = self.byte_pos - 1;
        let byte = self.read_byte_or(LexicalErrorKind::MalformedEscapeSequence)?;
        match byte {
            b'"' | b'\\' | b'/' => self.text_buf(into_key).push(byte),
            b'b' => self.text_buf(into_key).push(0x08),
            b'f' => self.text_buf(into_key).push(0x0C),
            b'n' => self.text_buf(into_key).push(b'\n'),
            b'r' => self.text_buf(into_key).push(b'\r'),
            b't' => self.text_buf(into_key).push(b'\t'),
            b'u' => {
                let c = self.read_unicode_escape_char()?;
                let mut char_encode_buf = [0; utf8::MAX_BYTES_PER_CHAR];
                let encoded_char = c.encode_utf8(&mut char_encode_buf);
                self.text_buf(into_key)
                    .extend_from_slice(encoded_char.as_bytes());
            }
            _ => return self.lexical_error(LexicalErrorKind::UnknownEscapeSequence, pos),
        }
        Ok(())
    }

    fn read_hex_digit(&mut self) -> Result<u32, ReaderError> {
        let pos = self.byte_pos;
        let digit = self.read_byte_or(LexicalErrorKind::MalformedEscapeSequence)?;
        match digit {
            b'0'..=b'9' => Ok(u32::from(digit - b'0')),
            b'a'..=b'f' => Ok(u32::from(digit - b'a' + 10)),
            b'A'..=b'F' => Ok(u32::from(digit - b'A' + 10)),
            _ => self.lexical_error(LexicalErrorKind::MalformedEscapeSequence, pos),
        }
    }

    /// Reads the `XXXX` of one `\uXXXX` escape
    fn read_unicode_escape(&mut self) -> Result<u32, ReaderError> {
        let d1 = self.read_hex_digit()?;
        let d2 = self.read_hex_digit()?;
        let d3 = self.read_hex_digit()?;
        let d4 = self.read_hex_digit()?;
        Ok(d4 | d3 << 4 | d2 << 8 | d1 << 12)
    }

    /// Reads a Unicode-escaped char; the caller has already consumed the `\u` prefix
    ///
    /// A high surrogate must be directly followed by a `\uXXXX` low surrogate; the pair is
    /// combined into the encoded code point.
    fn read_unicode_escape_char(&mut self) -> Result<char, ReaderError> {
        let pos = self.byte_pos;
        let c = self.read_unicode_escape()?;

        // Lone low surrogate
        if (0xDC00..=0xDFFF).contains(&c) {
            return self.lexical_error(LexicalErrorKind::UnpairedSurrogate, pos);
        }
        let c = if (0xD800..=0xDBFF).contains(&c) {
            // High surrogate, expect an escaped low surrogate
            if !(self.read_byte_or(LexicalErrorKind::UnpairedSurrogate)? == b'\\'
                && self.read_byte_or(LexicalErrorKind::UnpairedSurrogate)? == b'u')
            {
                return self.lexical_error(LexicalErrorKind::UnpairedSurrogate, pos);
            }
            let c2 = self.read_unicode_escape()?;
            if !(0xDC00..=0xDFFF).contains(&c2) {
                return self.lexical_error(LexicalErrorKind::UnpairedSurrogate, pos);
            }
            ((c - 0xD800) << 10 | (c2 - 0xDC00)) + 0x10000
        } else {
            c
        };

        // The checks above made sure this is a valid Rust `char`
        match char::from_u32(c) {
            Some(c) => Ok(c),
            None => self.lexical_error(LexicalErrorKind::MalformedEscapeSequence, pos),
        }
    }

    /// Reads and validates a multi-byte UTF-8 sequence whose first byte is `byte0`
    fn parse_multibyte(&mut self, byte0: u8, into_key: bool) -> Result<(), ReaderError> {
        let pos = self.byte_pos - 1;
        let len = match utf8::expected_sequence_len(byte0) {
            Some(len) => len,
            None => return self.lexical_error(LexicalErrorKind::InvalidUtf8, pos),
        };

        let mut sequence = [0_u8; utf8::MAX_BYTES_PER_CHAR];
        sequence[0] = byte0;
        for target in sequence.iter_mut().take(len).skip(1) {
            let byte = self.read_byte()?;
            if !utf8::is_continuation(byte) {
                return self.lexical_error(LexicalErrorKind::InvalidUtf8, pos);
            }
            *target = byte;
        }
        if !utf8::is_valid_sequence(&sequence[..len]) {
            return self.lexical_error(LexicalErrorKind::InvalidUtf8, pos);
        }
        self.text_buf(into_key).extend_from_slice(&sequence[..len]);
        Ok(())
    }
}

// Implementation with the query surface
impl<R: Read> TextReader<R> {
    /// Number of currently open, not yet closed containers
    ///
    /// The depth is 0 exactly before the root container was opened (which never occurs for
    /// a constructed reader, since construction consumes the first token) and again once
    /// the document has been fully consumed.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether further [`read`](Self::read) calls can produce tokens
    ///
    /// This is false once the container stack is empty (the document has been fully
    /// consumed, or the document is a bare top-level value) and after any error.
    pub fn is_valid(&self) -> bool {
        !self.failed && !self.stack.is_empty()
    }

    /// Whether the underlying stream failed
    ///
    /// This distinguishes transport failures from malformed JSON: after a
    /// [`ReaderError::Io`] this reports true, after a grammar error it stays false.
    pub fn is_bad(&self) -> bool {
        self.bad
    }

    /// Whether the end of the input has been reached
    ///
    /// This may read from the underlying reader to find out.
    pub fn is_eof(&mut self) -> Result<bool, ReaderError> {
        Ok(self.peek_byte()?.is_none())
    }

    /// Whether the cursor is currently inside an array
    ///
    /// This reports the kind of the innermost open container, not the type of the current
    /// token; directly after an array was opened or between its elements this is true.
    pub fn is_array(&self) -> bool {
        self.stack.last() == Some(&NodeType::Array)
    }

    /// Whether the cursor is currently inside an object
    pub fn is_object(&self) -> bool {
        self.stack.last() == Some(&NodeType::Object)
    }

    /// Whether the current token is `null`
    pub fn is_null(&self) -> bool {
        self.value_type == ValueType::Null
    }

    /// Whether the current token is a boolean
    pub fn is_bool(&self) -> bool {
        self.value_type == ValueType::Boolean
    }

    /// Whether the current token is a number
    pub fn is_number(&self) -> bool {
        self.value_type == ValueType::Number
    }

    /// Whether the current token is a string
    pub fn is_string(&self) -> bool {
        self.value_type == ValueType::String
    }

    /// Whether the current token opened a container
    pub fn is_start_node(&self) -> bool {
        matches!(
            self.value_type,
            ValueType::ArrayStart | ValueType::ObjectStart
        )
    }

    /// Whether the current token closed a container
    pub fn is_end_node(&self) -> bool {
        matches!(self.value_type, ValueType::ArrayEnd | ValueType::ObjectEnd)
    }

    /// Type of the most recently parsed token
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Best-effort byte position of the cursor in the document
    pub fn position(&self) -> u64 {
        self.byte_pos
    }

    /// Whether a member name was parsed in the current step
    ///
    /// This is true for an object member's scalar value and for the start event of a
    /// container which is an object member's value. End events and array elements carry
    /// no member name.
    pub fn has_key(&self) -> bool {
        self.has_key
    }

    /// Whether the current token carries value text
    ///
    /// This is derived from the token type, not from the text buffer, so a string value
    /// which happens to be empty still reports true. Start and end events report false.
    pub fn has_value(&self) -> bool {
        matches!(
            self.value_type,
            ValueType::Null | ValueType::Number | ValueType::Boolean | ValueType::String
        )
    }

    /// Raw text of the most recently parsed member name
    ///
    /// The text is only meaningful while [`has_key`](Self::has_key) is true; it is
    /// overwritten by the next [`read`](Self::read) call.
    pub fn key_str(&self) -> &str {
        utf8::to_str_unchecked(&self.key_buf)
    }

    /// Raw text of the most recently parsed value
    ///
    /// For strings this is the decoded content, for numbers and literals their lexical
    /// representation. The text is only meaningful while [`has_value`](Self::has_value) is
    /// true; it is overwritten by the next [`read`](Self::read) call.
    pub fn value_str(&self) -> &str {
        utf8::to_str_unchecked(&self.value_buf)
    }

    /// Converts the current member name to a typed value
    ///
    /// # Errors
    /// Fails when no member name was parsed in the current step, or when the conversion
    /// itself fails.
    pub fn key<T: FromJsonText>(&self) -> Result<T, ExtractError> {
        if !self.has_key() {
            return Err(ExtractError::Unavailable(
                "no member name at the current position",
            ));
        }
        T::from_json_text(self.key_str())
    }

    /// Converts the current value text to a typed value
    ///
    /// # Errors
    /// Fails when the current token carries no value (start and end events), or when the
    /// conversion itself fails.
    pub fn value<T: FromJsonText>(&self) -> Result<T, ExtractError> {
        if !self.has_value() {
            return Err(ExtractError::Unavailable(
                "no value at the current position",
            ));
        }
        T::from_json_text(self.value_str())
    }
}

// Implementation with seek methods
impl<R: Read> TextReader<R> {
    /// Advances the cursor until a member with the given name is current
    ///
    /// Returns whether the target was reached; once the reader becomes invalid without a
    /// match, `false` is returned. This is a linear scan, its cost is proportional to the
    /// number of skipped tokens.
    pub fn seek_key(&mut self, key: &str) -> Result<bool, ReaderError> {
        self.seek_until(|r| r.has_key() && r.key_str() == key)
    }

    /// Advances the cursor until the nesting depth equals `depth`
    pub fn seek_depth(&mut self, depth: usize) -> Result<bool, ReaderError> {
        self.seek_until(|r| r.depth() == depth)
    }

    /// Advances the cursor until a member with the given name is current at the given depth
    pub fn seek_key_at(&mut self, key: &str, depth: usize) -> Result<bool, ReaderError> {
        self.seek_until(|r| r.depth() == depth && r.has_key() && r.key_str() == key)
    }

    fn seek_until(
        &mut self,
        predicate: impl Fn(&TextReader<R>) -> bool,
    ) -> Result<bool, ReaderError> {
        loop {
            if predicate(self) {
                return Ok(true);
            }
            if !self.is_valid() {
                return Ok(false);
            }
            self.read()?;
        }
    }
}
