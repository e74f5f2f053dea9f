//! Internal module for validating JSON numbers

/// Returns whether the string is a valid JSON number
///
/// The JSON specification requires: an optional minus sign, an integer part without
/// redundant leading 0s, an optional fraction part with at least one digit and an
/// optional exponent part with at least one digit whose sign may only directly
/// follow the `e` / `E`.
pub(crate) fn is_valid_json_number(number: &str) -> bool {
    #[derive(PartialEq)]
    enum State {
        Start,
        Minus,
        IntZero,
        IntNonZero,
        DecimalPoint,
        DecimalDigit,
        ExpE,
        ExpSign,
        ExpDigit,
    }

    let mut state = State::Start;

    for byte in number.bytes() {
        state = match byte {
            b'-' => match state {
                State::Start => State::Minus,
                State::ExpE => State::ExpSign,
                _ => return false,
            },
            b'0' => match state {
                State::Start | State::Minus => State::IntZero,
                // A leading 0 must not be followed by further digits
                State::IntZero => return false,
                State::IntNonZero => State::IntNonZero,
                State::DecimalPoint | State::DecimalDigit => State::DecimalDigit,
                State::ExpE | State::ExpSign | State::ExpDigit => State::ExpDigit,
            },
            b'1'..=b'9' => match state {
                State::Start | State::Minus | State::IntNonZero => State::IntNonZero,
                State::IntZero => return false,
                State::DecimalPoint | State::DecimalDigit => State::DecimalDigit,
                State::ExpE | State::ExpSign | State::ExpDigit => State::ExpDigit,
            },
            b'.' => match state {
                State::IntZero | State::IntNonZero => State::DecimalPoint,
                _ => return false,
            },
            b'e' | b'E' => match state {
                State::IntZero | State::IntNonZero | State::DecimalDigit => State::ExpE,
                _ => return false,
            },
            b'+' => match state {
                State::ExpE => State::ExpSign,
                _ => return false,
            },
            _ => return false,
        };
    }

    matches!(
        state,
        State::IntZero | State::IntNonZero | State::DecimalDigit | State::ExpDigit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_numbers() {
        let valid_numbers = [
            "0",
            "-0",
            "-1",
            "123",
            "0.1",
            "56.0030",
            "-0.1",
            "1.01e+03",
            "-4.50E-40",
            "1e5",
            "0e0",
            "9000000000000000000000000000",
        ];
        for number in valid_numbers {
            assert!(
                is_valid_json_number(number),
                "Expected to be valid: {number}"
            );
        }
    }

    #[test]
    fn invalid_numbers() {
        let invalid_numbers = [
            "", "-", "--1", "-.1", "00", "01", "-01", "1.", "1.-1", "1.e1", ".5", "1e", "1ee1",
            "1eE1", "1e-", "1e+", "1e--1", "1e+-1", "1e.1", "+1", "NaN", "inf", "Infinity",
            "0x12", "1 ", " 1",
        ];
        for number in invalid_numbers {
            assert!(
                !is_valid_json_number(number),
                "Expected to be invalid: {number}"
            );
        }
    }
}
