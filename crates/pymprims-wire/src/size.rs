//! Numeric payloads.
//!
//! Size payloads (`width`, `height`, `scrollToChildPos`) are parsed the way a
//! browser's `parseInt` reads them: leading whitespace and sign, then the
//! longest run of digits. A payload with no leading digits parses to NaN, and
//! NaN is carried through rather than rejected.

use std::fmt;

/// A parsed size payload. May be NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SizeValue(f64);

impl SizeValue {
    /// The not-a-number size produced by unparseable payloads.
    pub const NAN: SizeValue = SizeValue(f64::NAN);

    /// Wrap a raw number.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw number.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// The value as an integer, if it is finite.
    pub fn as_i64(self) -> Option<i64> {
        if self.0.is_finite() {
            Some(self.0 as i64)
        } else {
            None
        }
    }

    /// Returns true if the payload did not parse.
    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }

    /// Returns true unless both values are the same number.
    ///
    /// NaN differs from everything, itself included.
    pub fn differs_from(self, other: SizeValue) -> bool {
        self.0 != other.0
    }
}

impl From<i64> for SizeValue {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl fmt::Display for SizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_js_number(self.0))
    }
}

/// Parse a payload with `parseInt` semantics (radix 10, or 16 after `0x`).
pub fn parse_int(input: &str) -> SizeValue {
    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(digits.len(), |(idx, _)| idx);
    let digits = &digits[..end];

    if digits.is_empty() {
        return SizeValue::NAN;
    }

    let magnitude = digits.chars().fold(0f64, |acc, c| {
        acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
    });

    SizeValue(if negative { -magnitude } else { magnitude })
}

/// Format a number the way a browser stringifies it in string concatenation.
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if value == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&value.abs()) {
        value.to_string()
    } else {
        // Outside [1e-6, 1e21) browsers switch to exponent form with an
        // explicit sign on the exponent.
        let formatted = format!("{value:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integers() {
        assert_eq!(parse_int("400"), SizeValue::new(400.0));
        assert_eq!(parse_int("  -25"), SizeValue::new(-25.0));
        assert_eq!(parse_int("+7"), SizeValue::new(7.0));
    }

    #[test]
    fn stops_at_first_non_digit() {
        assert_eq!(parse_int("400px"), SizeValue::new(400.0));
        assert_eq!(parse_int("12.9"), SizeValue::new(12.0));
        assert_eq!(parse_int("3 4"), SizeValue::new(3.0));
    }

    #[test]
    fn reads_hex_prefix() {
        assert_eq!(parse_int("0x1A"), SizeValue::new(26.0));
        assert!(parse_int("0x").is_nan());
    }

    #[test]
    fn unparseable_payloads_are_nan() {
        assert!(parse_int("").is_nan());
        assert!(parse_int("abc").is_nan());
        assert!(parse_int("-").is_nan());
        assert!(parse_int("px400").is_nan());
    }

    #[test]
    fn nan_differs_from_itself() {
        assert!(SizeValue::NAN.differs_from(SizeValue::NAN));
        assert!(!SizeValue::new(5.0).differs_from(SizeValue::new(5.0)));
        assert!(SizeValue::new(5.0).differs_from(SizeValue::new(6.0)));
    }

    #[test]
    fn formats_like_a_browser() {
        assert_eq!(format!("{}px", parse_int("400")), "400px");
        assert_eq!(format!("{}px", parse_int("oops")), "NaNpx");
        assert_eq!(format_js_number(-0.0), "0");
        assert_eq!(format_js_number(12.5), "12.5");
        assert_eq!(format_js_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn large_and_tiny_numbers_use_exponent_form() {
        assert_eq!(format_js_number(1e21), "1e+21");
        assert_eq!(format_js_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_js_number(1e-7), "1e-7");
        assert_eq!(format_js_number(1e20), "100000000000000000000");
        assert_eq!(format_js_number(0.000001), "0.000001");
        assert_eq!(SizeValue::new(1e21).to_string(), "1e+21");
        assert_eq!(SizeValue::new(-3.0).to_string(), "-3");
    }

    #[test]
    fn integer_view() {
        assert_eq!(parse_int("800").as_i64(), Some(800));
        assert_eq!(SizeValue::NAN.as_i64(), None);
    }
}
