//! Numeric coercion of weight fields.
//!
//! Weights arrive as text. They are coerced the way a loosely typed
//! pipeline coerces a string to a number: surrounding whitespace is ignored,
//! an empty string counts as `0`, integer literals may carry a `0x`, `0o` or
//! `0b` prefix, `Infinity` may carry a sign, and everything else has to be a
//! plain decimal literal. Text that fails these rules has no numeric value;
//! the builder then stores `NaN` for the leaf.

/// Coerces a weight string into a number.
///
/// # Returns
/// `Some(number)` if the text is numeric, `None` otherwise
///
/// # Examples
/// ```
/// # use rowtree::rows::parse_weight;
/// assert_eq!(parse_weight("42"), Some(42.0));
/// assert_eq!(parse_weight(" 1.5e3 "), Some(1500.0));
/// assert_eq!(parse_weight(""), Some(0.0));
/// assert_eq!(parse_weight("0x1F"), Some(31.0));
/// assert_eq!(parse_weight("-Infinity"), Some(f64::NEG_INFINITY));
/// assert_eq!(parse_weight("12kb"), None);
/// assert_eq!(parse_weight("nan"), None);
/// ```
pub fn parse_weight(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(value) = parse_prefixed_integer(text) {
        return value;
    }

    // Only digits, sign, point and exponent marker are allowed; this rules out
    // the "inf" and "nan" spellings the float parser would otherwise accept
    if text
        .chars()
        .any(|c| !matches!(c, '0'..='9' | '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }

    text.parse::<f64>().ok()
}

/// Parses `0x`, `0o` and `0b` prefixed integer literals (no sign allowed).
///
/// Returns `None` if `text` has no such prefix, `Some(None)` if it has one
/// but invalid digits.
fn parse_prefixed_integer(text: &str) -> Option<Option<f64>> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }

    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };

    let digits = &text[2..];
    if digits.is_empty() {
        return Some(None);
    }

    Some(digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_weight("3938"), Some(3938.0));
        assert_eq!(parse_weight("-2.25"), Some(-2.25));
        assert_eq!(parse_weight("+7"), Some(7.0));
        assert_eq!(parse_weight(".5"), Some(0.5));
        assert_eq!(parse_weight("5."), Some(5.0));
    }

    #[test]
    fn test_whitespace_only_is_zero() {
        assert_eq!(parse_weight("   "), Some(0.0));
        assert_eq!(parse_weight("\t12\n"), Some(12.0));
    }

    #[test]
    fn test_prefixed_integers() {
        assert_eq!(parse_weight("0b101"), Some(5.0));
        assert_eq!(parse_weight("0o17"), Some(15.0));
        assert_eq!(parse_weight("0xff"), Some(255.0));
        assert_eq!(parse_weight("0x"), None);
        assert_eq!(parse_weight("0xfg"), None);
        assert_eq!(parse_weight("-0x10"), None);
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(parse_weight("abc"), None);
        assert_eq!(parse_weight("1,000"), None);
        assert_eq!(parse_weight("inf"), None);
        assert_eq!(parse_weight("infinity"), None);
        assert_eq!(parse_weight("NaN"), None);
        assert_eq!(parse_weight("1e"), None);
        assert_eq!(parse_weight("."), None);
    }
}
