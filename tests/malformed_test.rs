//! Robustness sweep over malformed input
//!
//! Mirrors the fuzzing contract: for arbitrary bytes, constructing a reader and driving it
//! to exhaustion either completes or raises a defined error; it never panics and never
//! loops forever. The inputs here are deterministic mutations of valid documents plus
//! pseudo-random byte strings.

use curson::reader::TextReader;

const SEED_DOCUMENTS: &[&str] = &[
    "[]",
    "{}",
    "[1, 2, 3]",
    r#"{"a": 1, "b": [true, false, null]}"#,
    r#"{"nested": {"deep": [{"x": "y"}]}}"#,
    r#"["escape \n A 𝄞", -12.5e-3]"#,
    "[NaN, inf, -Infinity]",
    r#""bare""#,
    "42",
];

/// Drives a reader over the bytes to exhaustion
///
/// Every `read()` call consumes at least one input byte or terminates, so the number of
/// successful steps is bounded by the input length.
fn drive(data: &[u8]) {
    let mut reader = match TextReader::new(data) {
        Ok(reader) => reader,
        Err(_) => return,
    };
    let mut steps = 0_usize;
    loop {
        match reader.read() {
            Ok(true) => {
                steps += 1;
                assert!(
                    steps <= data.len() + 4,
                    "Reader did not terminate for input: {data:02X?}"
                );
            }
            Ok(false) => return,
            Err(_) => return,
        }
    }
}

#[test]
fn truncations() {
    for document in SEED_DOCUMENTS {
        let bytes = document.as_bytes();
        for len in 0..bytes.len() {
            drive(&bytes[..len]);
        }
    }
}

#[test]
fn byte_substitutions() {
    let replacements: &[u8] = b"{}[],:\"\\'01x \t\niN-\x00\x1F\x7F\x80\xC3\xED\xF7\xFF";
    for document in SEED_DOCUMENTS {
        for position in 0..document.len() {
            for &replacement in replacements {
                let mut bytes = document.as_bytes().to_vec();
                bytes[position] = replacement;
                drive(&bytes);
            }
        }
    }
}

#[test]
fn byte_insertions() {
    let insertions: &[u8] = b"{}[],:\"\\0 \xC3\xFF";
    for document in SEED_DOCUMENTS {
        for position in 0..=document.len() {
            for &insertion in insertions {
                let mut bytes = document.as_bytes().to_vec();
                bytes.insert(position, insertion);
                drive(&bytes);
            }
        }
    }
}

#[test]
fn pseudo_random_bytes() {
    // Small deterministic LCG; no randomness dependency needed for this sweep
    let mut state = 0x2545F491_u64;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u8
    };

    for _ in 0..512 {
        let len = (next() % 64) as usize;
        let bytes: Vec<u8> = (0..len).map(|_| next()).collect();
        drive(&bytes);
    }

    // Structural characters only, which stress the state machine the most
    let structural: &[u8] = b"{}[],:\"0 ";
    for _ in 0..512 {
        let len = (next() % 48) as usize;
        let bytes: Vec<u8> = (0..len)
            .map(|_| structural[(next() as usize) % structural.len()])
            .collect();
        drive(&bytes);
    }
}

#[test]
fn deep_nesting_terminates() {
    // No recursion is used for parsing, so deep nesting must neither overflow the stack
    // nor hang; the unclosed document is rejected as truncated
    let mut document = String::new();
    for _ in 0..100_000 {
        document.push('[');
    }
    drive(document.as_bytes());

    let mut document = String::new();
    for _ in 0..10_000 {
        document.push('[');
    }
    for _ in 0..10_000 {
        document.push(']');
    }
    drive(document.as_bytes());
}
