//! Macro and name alias tables for the cron dialect.
//!
//! Whole-expression macros (`@daily`, `@hourly`, ...) expand to their
//! six-field form before any field parsing happens; month and weekday
//! fields additionally accept 3-letter name aliases resolved here.

use crate::core::field::FieldKind;

/// Expand a whole-expression macro to its six-field form.
///
/// Returns the input unchanged when it is not one of the known macros,
/// so callers can feed the result straight into field parsing.
pub fn expand_macro(expression: &str) -> &str {
    match expression.trim().to_ascii_lowercase().as_str() {
        "@yearly" | "@annually" => "0 0 1 1 *",
        "@monthly" => "0 0 1 * *",
        "@weekly" => "0 0 * * 0",
        "@daily" => "0 0 * * *",
        "@hourly" => "0 * * * *",
        "@minutely" => "* * * * *",
        _ => expression,
    }
}

/// Resolve a 3-letter month or weekday name to its numeric code.
///
/// Case-insensitive. Returns `None` for field kinds without name aliases
/// and for unknown tokens; the caller then parses the token as a number.
pub fn name_alias(kind: FieldKind, token: &str) -> Option<u32> {
    let code = match kind {
        FieldKind::Month => match token.to_ascii_lowercase().as_str() {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        },
        FieldKind::Weekday => match token.to_ascii_lowercase().as_str() {
            "sun" => 0,
            "mon" => 1,
            "tue" => 2,
            "wed" => 3,
            "thu" => 4,
            "fri" => 5,
            "sat" => 6,
            _ => return None,
        },
        _ => return None,
    };
    Some(code)
}
