//! Views and iterators over the immediate children of a container
//!
//! A view is a non-owning range over the container the reader is currently positioned in.
//! It is built strictly on top of the public cursor surface: iterating calls
//! [`read`](TextReader::read) and inspects depth and token type, nothing else.

use std::io::Read;

use super::*;
use crate::extract::{ExtractError, FromJsonText};

/// Owned snapshot of one iterated element
///
/// The reader's text buffers are overwritten by every [`read`](TextReader::read) call, so
/// the iterators hand out snapshots taken at yield time instead of references into the
/// reader. A cell representing the opening of a nested container carries no text.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ValueCell {
    text: String,
    value_type: ValueType,
}

impl ValueCell {
    fn of_value<R: Read>(reader: &TextReader<R>) -> Self {
        ValueCell {
            text: reader.value_str().to_owned(),
            value_type: reader.value_type(),
        }
    }

    fn of_key<R: Read>(reader: &TextReader<R>) -> Self {
        ValueCell {
            text: reader.key_str().to_owned(),
            value_type: ValueType::String,
        }
    }

    /// Type of the token this cell was taken from
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Whether this cell is the placeholder for the opening of a nested container
    ///
    /// The contents of the nested container are not part of the iteration; obtain a fresh
    /// view from the reader to consume them.
    pub fn is_container(&self) -> bool {
        matches!(
            self.value_type,
            ValueType::ArrayStart | ValueType::ObjectStart
        )
    }

    /// The snapshot text; empty for container placeholders
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Converts the snapshot text to a typed value
    pub fn get<T: FromJsonText>(&self) -> Result<T, ExtractError> {
        T::from_json_text(&self.text)
    }
}

/// Seeks the next yieldable node for an iterator with the given home depth
///
/// Returns `false` once the iterated container has been exited. Nodes deeper inside nested
/// containers and the end events of nested containers are skipped; the iteration yields
/// sibling scalars and the opening events of sibling containers only.
fn next_element<R: Read>(
    reader: &mut TextReader<R>,
    home_depth: usize,
) -> Result<bool, ReaderError> {
    loop {
        if !reader.is_valid() {
            return Ok(false);
        }
        reader.read()?;
        let depth = reader.depth();
        if depth < home_depth {
            // The iterated container was closed
            return Ok(false);
        }
        if depth == home_depth && reader.has_value() {
            // Sibling scalar at this level
            return Ok(true);
        }
        if depth == home_depth + 1 && reader.is_start_node() {
            // A sibling which is itself a container; yield its opening event
            return Ok(true);
        }
    }
}

/// View over the immediate elements of the current array
///
/// Obtained from [`TextReader::array`]. See [`ArrayItems`] for the iteration contract.
pub struct ArrayView<'r, R: Read> {
    reader: &'r mut TextReader<R>,
}

impl<'r, R: Read> ArrayView<'r, R> {
    /// Starts iterating, recording the current depth as the iteration's home depth
    pub fn iter(self) -> ArrayItems<'r, R> {
        ArrayItems {
            home_depth: self.reader.depth(),
            reader: self.reader,
            done: false,
        }
    }
}

/// View over the immediate members of the current object
///
/// Obtained from [`TextReader::object`]. See [`ObjectItems`] for the iteration contract.
pub struct ObjectView<'r, R: Read> {
    reader: &'r mut TextReader<R>,
}

impl<'r, R: Read> ObjectView<'r, R> {
    /// Starts iterating, recording the current depth as the iteration's home depth
    pub fn iter(self) -> ObjectItems<'r, R> {
        ObjectItems {
            home_depth: self.reader.depth(),
            reader: self.reader,
            done: false,
        }
    }
}

/// Streaming iterator over the immediate elements of an array
///
/// Scalar elements are yielded as cells with their text; an element which is itself a
/// container is yielded as one empty placeholder cell for its opening event — its contents
/// are not flattened into the iteration. To consume the nested contents, obtain a nested
/// view via [`reader`](Self::reader) directly after the placeholder was yielded; once the
/// nested view finished, this iterator continues with the elements after the container.
///
/// Advancing the reader through any other path while the iteration is live invalidates
/// the iteration; the borrow rules prevent this except through [`reader`](Self::reader).
pub struct ArrayItems<'r, R: Read> {
    reader: &'r mut TextReader<R>,
    home_depth: usize,
    done: bool,
}

impl<R: Read> ArrayItems<'_, R> {
    /// Advances to and returns the next element, or `None` once the array was exited
    ///
    /// After `None` was returned once, all further calls return `None` as well.
    pub fn next_value(&mut self) -> Result<Option<ValueCell>, ReaderError> {
        if self.done {
            return Ok(None);
        }
        if next_element(self.reader, self.home_depth)? {
            Ok(Some(ValueCell::of_value(self.reader)))
        } else {
            self.done = true;
            Ok(None)
        }
    }

    /// The underlying reader, for obtaining a nested view mid-iteration
    pub fn reader(&mut self) -> &mut TextReader<R> {
        self.reader
    }
}

/// Streaming iterator over the immediate members of an object
///
/// Yields `(name, value)` cell pairs. A member whose value is a container is yielded as
/// its name plus the empty placeholder cell for the container's opening event, like
/// [`ArrayItems`].
pub struct ObjectItems<'r, R: Read> {
    reader: &'r mut TextReader<R>,
    home_depth: usize,
    done: bool,
}

impl<R: Read> ObjectItems<'_, R> {
    /// Advances to and returns the next member, or `None` once the object was exited
    ///
    /// After `None` was returned once, all further calls return `None` as well.
    pub fn next_member(&mut self) -> Result<Option<(ValueCell, ValueCell)>, ReaderError> {
        if self.done {
            return Ok(None);
        }
        if next_element(self.reader, self.home_depth)? {
            Ok(Some((
                ValueCell::of_key(self.reader),
                ValueCell::of_value(self.reader),
            )))
        } else {
            self.done = true;
            Ok(None)
        }
    }

    /// The underlying reader, for obtaining a nested view mid-iteration
    pub fn reader(&mut self) -> &mut TextReader<R> {
        self.reader
    }
}

impl<R: Read> TextReader<R> {
    /// A view over the immediate elements of the current array
    ///
    /// The reader must currently be inside an array, either positioned at its start event
    /// or between its elements.
    ///
    /// # Errors
    /// A [`StructuralErrorKind::ContainerKindMismatch`] is returned when the current
    /// container is not an array. The mismatch is detected eagerly and does not advance
    /// the reader, so the reader stays usable.
    pub fn array(&mut self) -> Result<ArrayView<'_, R>, ReaderError> {
        if !self.is_array() {
            return Err(ReaderError::Structural {
                kind: StructuralErrorKind::ContainerKindMismatch,
                pos: self.position(),
            });
        }
        Ok(ArrayView { reader: self })
    }

    /// A view over the immediate members of the current object
    ///
    /// The reader must currently be inside an object, either positioned at its start event
    /// or between its members.
    ///
    /// # Errors
    /// A [`StructuralErrorKind::ContainerKindMismatch`] is returned when the current
    /// container is not an object. The mismatch is detected eagerly and does not advance
    /// the reader, so the reader stays usable.
    pub fn object(&mut self) -> Result<ObjectView<'_, R>, ReaderError> {
        if !self.is_object() {
            return Err(ReaderError::Structural {
                kind: StructuralErrorKind::ContainerKindMismatch,
                pos: self.position(),
            });
        }
        Ok(ObjectView { reader: self })
    }
}
