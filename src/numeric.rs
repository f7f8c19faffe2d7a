//! Numeric text conventions shared by all three formats.
//!
//! Reading accepts fixed and scientific notation, including the Fortran `D`
//! exponent marker written by the engine. Writing is explicit per format:
//! parameter files get the shortest text that reads back to the same `f64`,
//! tabular files get a fixed number of fractional digits.

use std::borrow::Cow;

/// Fractional digits used when writing GEO-EAS values
pub const TABULAR_DECIMALS: usize = 10;

/// Parse a real number token, accepting `1.5`, `-3`, `1e21`, `1.0E+21` and `1.0D+21`
pub fn parse_real(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let normalized: Cow<'_, str> = if token.contains(['d', 'D']) {
        Cow::Owned(token.replace(['d', 'D'], "e"))
    } else {
        Cow::Borrowed(token)
    };

    // Rust accepts "inf"/"nan" spellings the engine never writes
    if normalized
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }

    normalized.parse::<f64>().ok()
}

/// Parse an integer token; a leading `+` is allowed, a fractional part is not
pub fn parse_integer<T: std::str::FromStr>(token: &str) -> Option<T> {
    token.trim().parse::<T>().ok()
}

/// Write a real for a parameter file.
///
/// Uses the shortest representation that round-trips, in scientific notation
/// outside `[1e-4, 1e15)`. The result always has a decimal point or exponent
/// so the engine's list-directed read treats it as a real.
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e15).contains(&magnitude) {
        return format!("{:e}", value);
    }

    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Write a real for a GEO-EAS data row
pub fn format_fixed(value: f64) -> String {
    format!("{:.*}", TABULAR_DECIMALS, value)
}
