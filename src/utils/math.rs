//! Token amount arithmetic
//!
//! Raw on-chain amounts are integers in the mint's smallest unit. Everything
//! the scanner reports is scaled by `10^decimals` into human units.

/// Scale a raw integer amount into token units.
///
/// # Examples
/// ```
/// use burn_history_scanner::utils::math::scale_raw_amount;
///
/// assert_eq!(scale_raw_amount(50_000_000, 6), 50.0);
/// assert_eq!(scale_raw_amount(1, 0), 1.0);
/// assert_eq!(scale_raw_amount(0, 9), 0.0);
/// ```
#[inline]
pub fn scale_raw_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

/// Scaled `pre - post`, or `None` when the balance did not go down.
///
/// A zero or negative difference means the account did not net-burn.
///
/// # Examples
/// ```
/// use burn_history_scanner::utils::math::positive_raw_decrease;
///
/// assert_eq!(positive_raw_decrease(300_000_000, 200_000_000, 6), Some(100.0));
/// assert_eq!(positive_raw_decrease(5, 5, 6), None);
/// assert_eq!(positive_raw_decrease(5, 9, 6), None);
/// ```
#[inline]
pub fn positive_raw_decrease(pre: u64, post: u64, decimals: u8) -> Option<f64> {
    match pre.checked_sub(post) {
        Some(diff) if diff > 0 => Some(scale_raw_amount(diff, decimals)),
        _ => None,
    }
}

/// Format a token amount with thousands separators and trimmed trailing zeros
///
/// # Examples
/// ```
/// use burn_history_scanner::utils::math::format_token_amount;
///
/// assert_eq!(format_token_amount(1234567.5, 6), "1,234,567.5");
/// assert_eq!(format_token_amount(150.0, 6), "150");
/// assert_eq!(format_token_amount(0.000001, 6), "0.000001");
/// ```
pub fn format_token_amount(amount: f64, decimals: u8) -> String {
    let fixed = format!("{:.*}", decimals as usize, amount);
    let (whole, fraction) = match fixed.split_once('.') {
        Some((w, f)) => (w.to_string(), f.trim_end_matches('0').to_string()),
        None => (fixed.clone(), String::new()),
    };

    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, fraction)
    }
}
