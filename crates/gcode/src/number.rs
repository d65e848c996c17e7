//! Scanning numbers off the front of a line.
//!
//! Both scanners return the parsed value (if there were any digits at all)
//! together with whatever is left of the input. A sign or a lone `.` with no
//! digits is still consumed, which matters for how the rest of the line gets
//! tokenized.

/// Skips spaces and tabs. Other whitespace can't appear inside a line once the
/// program has been split, so we don't bother with it.
pub(crate) fn skip_blanks(s: &str) -> &str {
    s.trim_start_matches(|c| c == ' ' || c == '\t')
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn digit_len(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_digit()).count()
}

/// Scans an optionally signed integer, stopping at the first non-digit.
///
/// Values too large for an `i32` saturate instead of wrapping.
pub fn parse_int(s: &str) -> (Option<i32>, &str) {
    let (negative, s) = split_sign(skip_blanks(s));
    let (digits, rest) = s.split_at(digit_len(s));
    if digits.is_empty() {
        return (None, rest);
    }

    let magnitude = digits.bytes().fold(0i32, |acc, d| {
        acc.saturating_mul(10).saturating_add(i32::from(d - b'0'))
    });
    (Some(if negative { -magnitude } else { magnitude }), rest)
}

/// Scans an optionally signed decimal: digits, then optionally a `.` and more
/// digits. There's no exponent syntax.
pub fn parse_float(s: &str) -> (Option<f32>, &str) {
    let (negative, s) = split_sign(skip_blanks(s));

    let mut len = digit_len(s);
    let mut any_digits = len > 0;
    if s[len..].starts_with('.') {
        let frac_len = digit_len(&s[len + 1..]);
        any_digits |= frac_len > 0;
        len += 1 + frac_len;
    }

    let (number, rest) = s.split_at(len);
    if !any_digits {
        return (None, rest);
    }
    // Rust's float grammar accepts "5." and ".5", so with at least one digit
    // present this can't fail.
    let value = number.parse::<f32>().ok();
    (value.map(|v| if negative { -v } else { v }), rest)
}
