//! Module for extracting typed values from raw JSON text
//!
//! [`FromJsonText`] is the conversion seam between the cursor API, which only
//! stores the raw text of the most recently parsed member name and value, and
//! the concrete types a caller wants. [`TextReader::key`](crate::reader::TextReader::key)
//! and [`TextReader::value`](crate::reader::TextReader::value) as well as the
//! view iterators use it to convert a lexical span on demand.

use std::num::{ParseFloatError, ParseIntError};

use duplicate::duplicate_item;
use thiserror::Error;

/// Error which occurred while converting raw JSON text to a typed value
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The text is not a boolean literal
    #[error("expected 'true' or 'false' but got '{0}'")]
    InvalidBool(String),
    /// The text is not a valid integer
    #[error("invalid integer: {0}")]
    InvalidInt(#[from] ParseIntError),
    /// The text is not a valid floating point number
    #[error("invalid number: {0}")]
    InvalidFloat(#[from] ParseFloatError),
    /// The text is empty but a character was requested
    #[error("cannot extract char from empty text")]
    EmptyChar,
    /// The cursor holds no text for the requested role
    ///
    /// This occurs for example when requesting a member name while the cursor
    /// is not positioned on an object member.
    #[error("{0}")]
    Unavailable(&'static str),
}

/// Conversion from the raw text of a parsed JSON token to a concrete type
///
/// The input is the *decoded* token text: for string values the text with all
/// escape sequences resolved, for numbers and literals their lexical
/// representation (`123.4e+10`, `true`, `NaN`, ...).
pub trait FromJsonText: Sized {
    /// Converts the token text to this type
    fn from_json_text(text: &str) -> Result<Self, ExtractError>;
}

impl FromJsonText for String {
    fn from_json_text(text: &str) -> Result<Self, ExtractError> {
        Ok(text.to_owned())
    }
}

impl FromJsonText for bool {
    fn from_json_text(text: &str) -> Result<Self, ExtractError> {
        match text {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ExtractError::InvalidBool(text.to_owned())),
        }
    }
}

impl FromJsonText for char {
    fn from_json_text(text: &str) -> Result<Self, ExtractError> {
        text.chars().next().ok_or(ExtractError::EmptyChar)
    }
}

// Use `duplicate` crate to avoid repeating code for all supported types, see https://stackoverflow.com/a/61467564
#[duplicate_item(type_template; [u8]; [i8]; [u16]; [i16]; [u32]; [i32]; [u64]; [i64]; [u128]; [i128]; [usize]; [isize])]
impl FromJsonText for type_template {
    fn from_json_text(text: &str) -> Result<Self, ExtractError> {
        Ok(text.parse()?)
    }
}

#[duplicate_item(type_template; [f32]; [f64])]
impl FromJsonText for type_template {
    fn from_json_text(text: &str) -> Result<Self, ExtractError> {
        // Both infinity spellings are accepted on read, normalize them here as well
        match text {
            "NaN" => Ok(type_template::NAN),
            "inf" | "Infinity" => Ok(type_template::INFINITY),
            "-inf" | "-Infinity" => Ok(type_template::NEG_INFINITY),
            _ => Ok(text.parse()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_scalars() {
        assert_eq!("text".to_owned(), String::from_json_text("text").unwrap());
        assert_eq!(true, bool::from_json_text("true").unwrap());
        assert_eq!(false, bool::from_json_text("false").unwrap());
        assert_eq!('a', char::from_json_text("abc").unwrap());
        assert_eq!(123_u32, u32::from_json_text("123").unwrap());
        assert_eq!(-45_i64, i64::from_json_text("-45").unwrap());
        assert_eq!(0.5_f64, f64::from_json_text("0.5").unwrap());
    }

    #[test]
    fn extract_non_finite() {
        assert!(f64::from_json_text("NaN").unwrap().is_nan());
        assert_eq!(f64::INFINITY, f64::from_json_text("inf").unwrap());
        assert_eq!(f64::INFINITY, f64::from_json_text("Infinity").unwrap());
        assert_eq!(f64::NEG_INFINITY, f64::from_json_text("-inf").unwrap());
        assert_eq!(f32::NEG_INFINITY, f32::from_json_text("-Infinity").unwrap());
    }

    #[test]
    fn extract_invalid() {
        assert!(matches!(
            bool::from_json_text("1"),
            Err(ExtractError::InvalidBool(_))
        ));
        assert!(matches!(
            u32::from_json_text("0.5"),
            Err(ExtractError::InvalidInt(_))
        ));
        assert!(matches!(
            char::from_json_text(""),
            Err(ExtractError::EmptyChar)
        ));
    }
}
