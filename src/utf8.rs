//! Utility module for UTF-8 data handling

/// Maximum number of UTF-8 bytes needed to encode one Unicode `char`
pub(crate) const MAX_BYTES_PER_CHAR: usize = 4;

/// Whether the byte on its own represents an ASCII character
pub(crate) fn is_ascii(b: u8) -> bool {
    b <= 0x7F
}

/// Whether the byte is a continuation byte of a multi-byte UTF-8 sequence
pub(crate) fn is_continuation(b: u8) -> bool {
    // 10xx_xxxx
    (b & 0b1100_0000) == 0b1000_0000
}

/// For a sequence start byte, the total number of bytes of the sequence
///
/// Returns `None` for bytes which do not start a multi-byte UTF-8 sequence,
/// including continuation bytes and bytes which are invalid anywhere in
/// UTF-8 data.
pub(crate) fn expected_sequence_len(b0: u8) -> Option<usize> {
    if (b0 & 0b1110_0000) == 0b1100_0000 {
        // 110x_xxxx
        Some(2)
    } else if (b0 & 0b1111_0000) == 0b1110_0000 {
        // 1110_xxxx
        Some(3)
    } else if (b0 & 0b1111_1000) == 0b1111_0000 {
        // 1111_0xxx
        Some(4)
    } else {
        None
    }
}

/// Whether the bytes form one valid multi-byte UTF-8 sequence
///
/// The caller must have verified that the first byte starts a sequence of
/// `bytes.len()` bytes and that all other bytes are continuation bytes; this
/// function only checks the decoded code point: no 'overlong encoding' of a
/// lower code point, no UTF-16 surrogate encoded in UTF-8 and no code point
/// above U+10FFFF.
pub(crate) fn is_valid_sequence(bytes: &[u8]) -> bool {
    match *bytes {
        [b0, b1] => {
            debug_assert!(expected_sequence_len(b0) == Some(2) && is_continuation(b1));
            let code_point = u32::from(b0 & 0b0001_1111) << 6 | u32::from(b1 & 0b0011_1111);
            code_point >= 0x80
        }
        [b0, b1, b2] => {
            debug_assert!(expected_sequence_len(b0) == Some(3));
            let code_point = u32::from(b0 & 0b0000_1111) << 12
                | u32::from(b1 & 0b0011_1111) << 6
                | u32::from(b2 & 0b0011_1111);
            code_point >= 0x800 && !matches!(code_point, 0xD800..=0xDFFF)
        }
        [b0, b1, b2, b3] => {
            debug_assert!(expected_sequence_len(b0) == Some(4));
            let code_point = u32::from(b0 & 0b0000_0111) << 18
                | u32::from(b1 & 0b0011_1111) << 12
                | u32::from(b2 & 0b0011_1111) << 6
                | u32::from(b3 & 0b0011_1111);
            matches!(code_point, 0x10000..=0x10FFFF)
        }
        _ => false,
    }
}

/// Converts bytes to a `str` without repeating full UTF-8 validation
///
/// Must only be called for bytes on which UTF-8 validation has already been
/// performed manually.
pub(crate) fn to_str_unchecked(bytes: &[u8]) -> &str {
    debug_assert!(
        std::str::from_utf8(bytes).is_ok(),
        "Unexpected: invalid UTF-8 bytes escaped validation: {bytes:02X?}"
    );
    std::str::from_utf8(bytes).unwrap_or_default()
}

/// Converts bytes to a `String` without repeating full UTF-8 validation
///
/// Must only be called for bytes on which UTF-8 validation has already been
/// performed manually.
pub(crate) fn to_string_unchecked(bytes: Vec<u8>) -> String {
    debug_assert!(
        std::str::from_utf8(&bytes).is_ok(),
        "Unexpected: invalid UTF-8 bytes escaped validation: {bytes:02X?}"
    );
    String::from_utf8(bytes).unwrap_or_default()
}
