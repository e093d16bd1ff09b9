//! Scalar rendering shared by the value formatter.

use crate::php::printer::quote_string;

/// Renders a float as a source literal. Non-finite values use the uppercase
/// constant tokens; finite values keep a decimal point so the literal reads
/// back as a float, not an int.
pub(super) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value == f64::INFINITY {
        return "INF".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-INF".to_string();
    }
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// Renders a string as a source literal, single-quoted unless the value
/// carries control whitespace that only a double-quoted literal can spell.
pub(super) fn quote_str(value: &str) -> String {
    quote_string(value)
}

#[cfg(test)]
mod tests {
    use super::{format_float, quote_str};

    #[test]
    fn non_finite_floats_use_constant_tokens() {
        assert_eq!(format_float(f64::NAN), "NAN");
        assert_eq!(format_float(f64::INFINITY), "INF");
        assert_eq!(format_float(f64::NEG_INFINITY), "-INF");
    }

    #[test]
    fn whole_floats_keep_a_decimal_point() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(1.5), "1.5");
    }

    #[test]
    fn strings_are_single_quoted_with_escapes() {
        assert_eq!(quote_str("plain"), "'plain'");
        assert_eq!(quote_str("it's"), "'it\\'s'");
        assert_eq!(quote_str("a\\b"), "'a\\\\b'");
    }

    #[test]
    fn control_whitespace_switches_to_double_quotes() {
        assert_eq!(quote_str("a\nb"), "\"a\\nb\"");
        assert_eq!(quote_str("a\tb $c"), "\"a\\tb \\$c\"");
    }
}
