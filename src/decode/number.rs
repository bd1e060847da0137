//! Lenient numeric and boolean decoding.
//!
//! Parsing stops at the first character that cannot continue the number,
//! keeping whatever was read so far. An empty or non-numeric cell is 0.

use crate::types::Oid;

/// Split off optional leading whitespace, sign and the run of digits.
fn leading_digits(text: &str) -> (bool, &str) {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    (negative, &rest[..end])
}

/// Decode a signed integer cell.
pub fn decode_i64(text: &str) -> i64 {
    let (negative, digits) = leading_digits(text);
    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(i64::from(b - b'0'))
    });
    if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }
}

/// Decode an unsigned wide integer cell (row counts, sizes, xids).
pub fn decode_u64(text: &str) -> u64 {
    let (negative, digits) = leading_digits(text);
    let magnitude = digits.bytes().fold(0u64, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
    });
    if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }
}

/// Decode an OID cell.
pub fn decode_oid(text: &str) -> Oid {
    decode_u64(text) as Oid
}

/// Decode a floating point cell.
///
/// Accepts the `NaN`/`Infinity` spellings PostgreSQL uses.
pub fn decode_f64(text: &str) -> f64 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return value;
    }

    // Fall back to the longest numeric prefix, e.g. "12.5abc" or "1e3x".
    trimmed[..float_prefix_len(trimmed)].parse().unwrap_or(0.0)
}

/// Length of the leading `[+-]digits[.digits][e[+-]digits]` run, `strtod` style.
fn float_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        start
            + bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }

    // An exponent only counts when digits follow it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

/// Decode a boolean cell.
///
/// `t`, `1` (as leading character) and `on` are true; everything else is false.
pub fn decode_bool(text: &str) -> bool {
    text.starts_with('t') || text.starts_with('1') || text == "on"
}
