//! Number presentation for statistic values.

/// Group digits with `,` every three places from the right.
///
/// ```
/// use hunterdash_domain::format::format_thousands;
/// assert_eq!(format_thousands(1_234_567), "1,234,567");
/// ```
#[must_use]
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Signed variant of [`format_thousands`].
#[must_use]
pub fn format_integer(value: i64) -> String {
    let grouped = format_thousands(value.unsigned_abs());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a numeric string the way a statistic widget would.
///
/// Surrounding whitespace is ignored, an empty string counts as zero,
/// fractions are rounded to the nearest integer and anything that is not a
/// finite number displays as `0`.
#[must_use]
pub fn format_numeric(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "0".to_string();
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            #[allow(clippy::cast_possible_truncation)]
            let rounded = value.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64;
            format_integer(rounded)
        }
        _ => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_not_group_numbers_below_one_thousand() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(57), "57");
        assert_eq!(format_thousands(999), "999");
    }

    #[test]
    fn should_insert_separator_every_three_digits() {
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_023), "1,023");
        assert_eq!(format_thousands(12_345), "12,345");
        assert_eq!(format_thousands(123_456), "123,456");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn should_format_largest_value() {
        assert_eq!(format_thousands(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn should_keep_sign_of_negative_integers() {
        assert_eq!(format_integer(-1_234), "-1,234");
        assert_eq!(format_integer(-5), "-5");
        assert_eq!(format_integer(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn should_format_numeric_strings() {
        assert_eq!(format_numeric("1234567"), "1,234,567");
        assert_eq!(format_numeric(" 1023 "), "1,023");
        assert_eq!(format_numeric("1e3"), "1,000");
    }

    #[test]
    fn should_round_fractional_strings() {
        assert_eq!(format_numeric("999.6"), "1,000");
        assert_eq!(format_numeric("12.4"), "12");
    }

    #[test]
    fn should_display_zero_for_non_numeric_input() {
        assert_eq!(format_numeric(""), "0");
        assert_eq!(format_numeric("abc"), "0");
        assert_eq!(format_numeric("NaN"), "0");
        assert_eq!(format_numeric("inf"), "0");
    }
}
