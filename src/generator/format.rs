//! Numeric formatting for canonical output.

/// Decimals kept for roughness coefficients.
pub const ROUGHNESS_DECIMALS: usize = 6;

/// Format a value with a fixed number of decimals.
///
/// Values that round to zero are written without a sign.
pub fn format_fixed(value: f64, precision: usize) -> String {
    let formatted = format!("{:.prec$}", value, prec = precision);
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.chars().all(|c| c == '0' || c == '.') => unsigned.to_string(),
        _ => formatted,
    }
}

/// Format a value with at most `max_decimals`, dropping trailing zeros.
pub fn format_trimmed(value: f64, max_decimals: usize) -> String {
    let formatted = format_fixed(value, max_decimals);
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Round a value to `precision` decimals.
pub fn round_to(value: f64, precision: usize) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
