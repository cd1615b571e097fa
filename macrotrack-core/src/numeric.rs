//! Decimal parsing and display for user-entered quantities.
//!
//! Every number in this domain is non-negative and carries at most two
//! decimal places once stored. Parsing never fails: unusable input falls
//! back to the caller's floor (or to `None` for the optional variant).

/// Decimal places kept for stored values.
pub const STORED_PLACES: u32 = 2;

/// Rounds `value` to `places` decimals, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Strips everything except digits and the first decimal point.
///
/// Digits after a second `.` are appended to the fraction, so `"1.2.3"`
/// becomes `"1.23"`. Signs are dropped.
fn strip_to_decimal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut seen_dot = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '.' && !seen_dot {
            out.push(c);
            seen_dot = true;
        }
    }
    out
}

/// Parses user text into a stored value, clamped to `min`.
pub fn parse_decimal(raw: &str, min: f64) -> f64 {
    parse_decimal_opt(raw, min).unwrap_or(min)
}

/// Like [`parse_decimal`], but returns `None` when the input holds no digit
/// at all, so callers can keep an "unset" state.
pub fn parse_decimal_opt(raw: &str, min: f64) -> Option<f64> {
    let stripped = strip_to_decimal(raw);
    if !stripped.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let value = stripped
        .parse::<f64>()
        .map(|v| round_to(v, STORED_PLACES))
        .unwrap_or(min);
    Some(clamp_min(value, min))
}

/// Floors a computed value at `min`, mapping NaN and infinities to `min`.
pub fn clamp_min(value: f64, min: f64) -> f64 {
    if !value.is_finite() || value < min {
        min
    } else {
        value
    }
}

/// Rounds to two decimals and trims trailing zeros: `3.0 -> "3"`,
/// `3.5 -> "3.5"`, `12.999 -> "13"`.
pub fn format_decimal(value: f64) -> String {
    let rounded = round_to(value, STORED_PLACES);
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
