//! Currency string parsing.

/// Parse a currency-formatted price into a number.
///
/// Every character other than an ASCII digit or `.` is dropped, then the
/// longest leading `digits[.digits]` run is parsed. Anything that does not
/// yield a number is 0. Never fails and never returns a negative value.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = i + 1;
    }

    cleaned[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
