// File: crates/spark-core/src/stats.rs
// Summary: Statistics and number formatting helpers shared by every chart type.

use crate::types::number_to_string;

/// Quartile of an ascending-sorted slice, `q` in `1..=3`.
///
/// The median averages the two central elements for even lengths. Q1/Q3 use the
/// 1-based position `(n*q + q) / 4` (odd n) or `(n*q + 2) / 4` (even n),
/// interpolating between neighbours when the position is fractional.
pub fn quartile(sorted: &[f64], q: u8) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if q == 2 {
        let mid = n / 2;
        return if n % 2 == 1 { sorted[mid] } else { (sorted[mid - 1] + sorted[mid]) / 2.0 };
    }
    let q = q as usize;
    let pos = if n % 2 == 1 { (n * q + q) as f64 / 4.0 } else { (n * q + 2) as f64 / 4.0 };
    let at = |one_based: usize| sorted[one_based.clamp(1, n) - 1];
    let whole = pos.floor();
    let frac = pos - whole;
    let lo = at(whole as usize);
    if frac == 0.0 {
        lo
    } else {
        let hi = at(whole as usize + 1);
        lo + (hi - lo) * frac
    }
}

/// Sum of the present values.
pub fn sum(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

/// True when every element equals `target`; nulls are skipped when `ignore_null` is set.
/// Vacuously true for an empty slice.
pub fn all<T: PartialEq>(target: &Option<T>, values: &[Option<T>], ignore_null: bool) -> bool {
    values
        .iter()
        .filter(|v| !(ignore_null && v.is_none()))
        .all(|v| v == target)
}

/// Fixed-precision (or full-precision when `precision` is `None`) formatting with
/// digit grouping every `group_size` digits left of the decimal mark.
pub fn format_number(
    n: f64,
    precision: Option<usize>,
    group_size: usize,
    group_sep: &str,
    decimal_sep: &str,
) -> String {
    let raw = match precision {
        Some(p) if n.is_finite() => format!("{n:.p$}"),
        _ => number_to_string(n),
    };
    if !n.is_finite() {
        return raw;
    }
    let (sign, body) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };

    let mut out = String::with_capacity(raw.len() + int_part.len() / group_size.max(1));
    out.push_str(sign);
    if group_size == 0 {
        out.push_str(int_part);
    } else {
        let digits: Vec<char> = int_part.chars().collect();
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % group_size == 0 {
                out.push_str(group_sep);
            }
            out.push(*d);
        }
    }
    if let Some(frac) = frac_part {
        out.push_str(decimal_sep);
        out.push_str(frac);
    }
    out
}

/// Min and max of the finite values, `None` when there are none.
pub fn min_max<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().filter(|v| !v.is_nan()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
