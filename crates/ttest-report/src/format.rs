//! Numeric cell formatting.
//!
//! Two conventions coexist for missing values: [`format_number`] yields a
//! null cell while [`format_number_or_blank`] yields an empty string. The
//! paired-samples tables use the former, the independent-samples tables the
//! latter.

use crate::table::Cell;

/// Decimal digits needed to print any `f64` exactly.
const EXACT_DIGITS: usize = 1074;

/// Display decimals a variable may contribute to a cell's precision.
pub const MAX_VARIABLE_DECIMALS: usize = 8;

/// Digits after the point beyond which `to_fixed` stops padding.
pub const MAX_FIXED_DECIMALS: usize = 100;

/// Cell precision for a variable's display decimals plus a statistic offset.
///
/// Decimals echoed back by a worker are untrusted; they are capped at
/// [`MAX_VARIABLE_DECIMALS`].
pub fn precision(decimals: usize, offset: usize) -> usize {
    decimals.min(MAX_VARIABLE_DECIMALS) + offset
}

/// Fixed-point text of `value` with `decimals` digits.
///
/// Rounds on the exact decimal expansion of the double, halves away from
/// zero. `-0.0` prints as zero; small negatives that round to zero keep
/// their sign (`-0.00`).
///
/// ```
/// use ttest_report::to_fixed;
///
/// assert_eq!(to_fixed(2.5, 0), "3");
/// assert_eq!(to_fixed(1.005, 2), "1.00");
/// assert_eq!(to_fixed(-1.25, 1), "-1.3");
/// ```
pub fn to_fixed(value: f64, decimals: usize) -> String {
    let decimals = decimals.min(MAX_FIXED_DECIMALS);
    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut text = String::with_capacity(int_part.len() + decimals + 2);
    text.push_str(int_part);
    if decimals > 0 {
        text.push('.');
        let kept = decimals.min(frac_part.len());
        text.push_str(&frac_part[..kept]);
        text.extend(std::iter::repeat_n('0', decimals - kept));
    }

    let round_up = frac_part
        .as_bytes()
        .get(decimals)
        .is_some_and(|&digit| digit >= b'5');
    if round_up {
        text = increment_last_digit(&text);
    }

    if value < 0.0 {
        text.insert(0, '-');
    }
    text
}

/// Adds one unit in the last place of an unsigned decimal string.
fn increment_last_digit(text: &str) -> String {
    let mut digits: Vec<char> = text.chars().collect();
    for i in (0..digits.len()).rev() {
        match digits[i] {
            '.' => {}
            '9' => digits[i] = '0',
            d => {
                digits[i] = char::from(d as u8 + 1);
                return digits.into_iter().collect();
            }
        }
    }
    digits.insert(0, '1');
    digits.into_iter().collect()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Fixed-point cell; missing or non-finite values become a null cell.
pub fn format_number(value: Option<f64>, decimals: usize) -> Cell {
    match finite(value) {
        Some(v) => Cell::Text(to_fixed(v, decimals)),
        None => Cell::Empty,
    }
}

/// Fixed-point cell; missing or non-finite values become `""`.
pub fn format_number_or_blank(value: Option<f64>, decimals: usize) -> Cell {
    format_number(value, decimals).or_blank()
}

/// Significance cell: `<.001` below one in a thousand, else three decimals.
pub fn format_p_value(value: Option<f64>) -> Cell {
    match finite(value) {
        Some(p) if p < 0.001 => Cell::Text("<.001".to_string()),
        Some(p) => Cell::Text(to_fixed(p, 3)),
        None => Cell::Empty,
    }
}

/// Degrees of freedom: whole numbers stay numeric, others get three decimals.
pub fn format_df(value: Option<f64>) -> Cell {
    match finite(value) {
        Some(df) if df.fract() == 0.0 && df.abs() < 9_007_199_254_740_992.0 => {
            Cell::Integer(df as i64)
        }
        Some(df) => Cell::Text(to_fixed(df, 3)),
        None => Cell::Empty,
    }
}
