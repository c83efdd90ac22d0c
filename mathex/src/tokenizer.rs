use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Digits before the decimal point.
    IntegerPart,
    /// Digits after the decimal point.
    FractionPart,
    /// Right after `e`/`E`.
    ExpStart,
    /// Right after the exponent sign.
    ExpSign,
    /// Exponent digits.
    ExpValue,
}

/// Returns true for bytes that may start a number literal.
pub fn starts_number(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b'.'
}

/// Returns true for bytes that may start an identifier.
pub fn starts_identifier(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

/// Scans the number literal starting at `start`.
///
/// Returns the value and the position right after the literal. An exponent
/// marker that is not followed by an exponent is left unconsumed, so the
/// caller sees it as the start of an identifier.
///
/// # Arguments
///
/// * `input` - The expression bytes.
/// * `start` - Position of the first digit or decimal point.
/// * `scientific` - Whether `e`/`E` introduces an exponent.
pub fn scan_number(input: &[u8], start: usize, scientific: bool) -> Result<(f64, usize), Error> {
    let mut state = State::IntegerPart;
    let mut value = 0.0;
    let mut decimal_place = 10.0;
    let mut digits = 0;
    let mut exponent = 0.0;
    let mut positive_exponent = true;
    let mut pos = start;

    while let Some(&c) = input.get(pos) {
        let digit = c.is_ascii_digit();
        let marker = scientific && (c == b'e' || c == b'E');

        state = match state {
            State::IntegerPart if digit => {
                value = value * 10.0 + f64::from(c - b'0');
                digits += 1;
                State::IntegerPart
            }
            State::IntegerPart if c == b'.' => State::FractionPart,
            State::IntegerPart | State::FractionPart if marker => State::ExpStart,
            State::FractionPart if digit => {
                value += f64::from(c - b'0') / decimal_place;
                decimal_place *= 10.0;
                digits += 1;
                State::FractionPart
            }
            State::ExpStart if c == b'+' || c == b'-' => {
                positive_exponent = c == b'+';
                State::ExpSign
            }
            State::ExpStart | State::ExpSign | State::ExpValue if digit => {
                exponent = exponent * 10.0 + f64::from(c - b'0');
                State::ExpValue
            }
            _ if c == b'.' => return Err(Error::SyntaxError),
            _ => break,
        };

        pos += 1;
    }

    match state {
        State::ExpStart => pos -= 1,
        State::ExpSign => pos -= 2,
        _ => {}
    }

    // ".1" and "1." are fine, a lone "." is not.
    if digits == 0 {
        return Err(Error::SyntaxError);
    }

    if state == State::ExpValue {
        let base: f64 = if positive_exponent { 10.0 } else { 0.1 };
        value *= base.powf(exponent);
    }

    Ok((value, pos))
}

/// Returns the position right after the identifier starting at `start`.
pub fn scan_identifier(input: &[u8], start: usize) -> usize {
    input[start..]
        .iter()
        .position(|c| !c.is_ascii_alphanumeric() && *c != b'_')
        .map_or(input.len(), |len| start + len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn number(input: &str) -> Result<(f64, usize), Error> {
        scan_number(input.as_bytes(), 0, true)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-12 * expected.abs().max(1.0),
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_integer_and_fraction() {
        assert_eq!(number("30"), Ok((30.0, 2)));
        assert_eq!(number("2.5"), Ok((2.5, 3)));
        assert_eq!(number(".1"), Ok((0.1, 2)));
        assert_eq!(number("1."), Ok((1.0, 2)));
        assert_eq!(number("12+3"), Ok((12.0, 2)));
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(number("."), Err(Error::SyntaxError));
        assert_eq!(number("1..4"), Err(Error::SyntaxError));
        assert_eq!(number("2.6."), Err(Error::SyntaxError));
        assert_eq!(number("1.6e4.3"), Err(Error::SyntaxError));
        assert_eq!(number(".e5"), Err(Error::SyntaxError));
    }

    #[test]
    fn test_scientific_notation() {
        let (value, end) = number("5e4").unwrap();
        assert_close(value, 50000.0);
        assert_eq!(end, 3);
        let (value, end) = number("5.3e4").unwrap();
        assert_close(value, 53000.0);
        assert_eq!(end, 5);
        let (value, end) = number("2.4e-2").unwrap();
        assert_close(value, 0.024);
        assert_eq!(end, 6);
        let (value, end) = number("2.4E+2").unwrap();
        assert_close(value, 240.0);
        assert_eq!(end, 6);
    }

    #[test]
    fn test_dangling_exponent_marker() {
        // The marker is left for the identifier scanner.
        assert_eq!(number("2.6e"), Ok((2.6, 3)));
        assert_eq!(number("3.4ee6"), Ok((3.4, 3)));
        assert_eq!(number("2e-x"), Ok((2.0, 1)));
        assert_eq!(number("2e+"), Ok((2.0, 1)));
    }

    #[test]
    fn test_scientific_notation_disabled() {
        assert_eq!(scan_number(b"5e4", 0, false), Ok((5.0, 1)));
    }

    #[test]
    fn test_scan_identifier() {
        assert_eq!(scan_identifier(b"foo_1 + 2", 0), 5);
        assert_eq!(scan_identifier(b"2pi", 1), 3);
        assert_eq!(scan_identifier(b"f(x)", 0), 1);
        assert!(starts_identifier(b'_'));
        assert!(!starts_identifier(b'1'));
        assert!(starts_number(b'.'));
    }
}
