#![warn(missing_docs)]
#![forbid(unsafe_code)]
// Allow needless `return` because that makes it sometimes more obvious that
// an expression is the result of the function
#![allow(clippy::needless_return)]
// Allow `assert_eq!(true, ...)` because in some cases it is used to check a bool
// value and not a 'flag' / 'state', and `assert_eq!` makes that more explicit
#![allow(clippy::bool_assert_comparison)]
// Enable 'unused' warnings for doc tests (are disabled by default)
#![doc(test(no_crate_inject))]
#![doc(test(attr(warn(unused))))]
// Fail on warnings in doc tests
#![doc(test(attr(deny(warnings))))]

//! Curson is a cursor-style streaming JSON reader and writer.
//!
//! Its main purpose is allowing to read and write JSON data in a memory efficient way without
//! having to store the complete JSON document structure in memory. It is however *not* an object
//! mapper which converts structs to JSON and vice versa; a dedicated library such as
//! [Serde](https://github.com/serde-rs/json) should be used for that.
//!
//! The reader exposes a single advancing operation, [`read`](reader::TextReader::read), which
//! moves the cursor forward by exactly one token and updates the cursor state: the nesting
//! depth, the type of the current token and the text of the most recently parsed member name
//! and value. Typed views ([`array`](reader::TextReader::array) and
//! [`object`](reader::TextReader::object)) layer iteration over the immediate children of the
//! current container on top of the same cursor.
//!
//! # Terminology
//!
//! This crate uses the same terminology as the JSON specification:
//!
//! - *object*: `{ ... }`
//!   - *member*: Entry in an object. For example the JSON object `{"a": 1}` has the member
//!     `"a": 1` where `"a"` is the member *name* (called *key* by the cursor API) and `1` is
//!     the member *value*.
//! - *array*: `[ ... ]`
//! - *literal*:
//!   - *boolean*: `true` or `false`
//!   - `null`
//! - *number*: number value, for example `123.4e+10`
//! - *string*: string value, for example `"text in \"quotes\""`
//!
//! A *container* is an array or an object; the *depth* of the cursor is the number of
//! currently open, not yet closed containers.
//!
//! # Usage examples
//!
//! ## Reading
//!
//! ```
//! # use curson::reader::*;
//! // In this example JSON data comes from a string;
//! // normally it would come from a file or a network connection
//! let json = r#"{"a": [1, true]}"#;
//! let mut reader = TextReader::new(json.as_bytes())?;
//! assert_eq!(ValueType::ObjectStart, reader.value_type());
//!
//! reader.read()?;
//! assert_eq!("a", reader.key::<String>()?);
//! assert_eq!(ValueType::ArrayStart, reader.value_type());
//!
//! reader.read()?;
//! assert_eq!(1_u32, reader.value()?);
//! reader.read()?;
//! assert_eq!(true, reader.value()?);
//!
//! reader.read()?; // closing ]
//! reader.read()?; // closing }
//! assert_eq!(false, reader.is_valid());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Writing
//! ```
//! # use curson::writer::*;
//! let mut writer = StringTextWriter::default();
//!
//! writer.start_object()?;
//! writer.write_key("a")?;
//!
//! writer.start_array()?;
//! writer.write_value(1)?;
//! writer.write_value(true)?;
//! writer.end_array()?;
//!
//! writer.end_object()?;
//!
//! assert_eq!(r#"{"a":[1,true]}"#, writer.as_str());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod extract;
pub mod reader;
pub mod writer;

mod json_number;
mod utf8;
