//! Fixed-point token amounts and their floating-point rendering.

use alloy_primitives::{I256, U256};

/// Decimal places of the tracked token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Convert a signed fixed-point token balance to a float.
///
/// The integer and fractional parts are rendered as a decimal string and parsed,
/// which yields the correctly rounded `f64` for any 256-bit balance.
pub fn units_to_f64(units: I256, decimals: u8) -> f64 {
    let magnitude = unsigned_units_to_f64(units.unsigned_abs(), decimals);
    if units.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

fn unsigned_units_to_f64(units: U256, decimals: u8) -> f64 {
    if decimals == 0 {
        return units.to_string().parse().unwrap_or(f64::INFINITY);
    }
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = units / scale;
    let frac = units % scale;
    let text = format!(
        "{}.{:0>width$}",
        whole,
        frac.to_string(),
        width = decimals as usize
    );
    // Both parts are plain decimal digits, so parsing cannot fail.
    text.parse().unwrap_or(f64::INFINITY)
}

/// Whole tokens as fixed-point units, e.g. `whole_tokens(1) == 10^18`.
pub fn whole_tokens(tokens: u64) -> U256 {
    U256::from(tokens) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// Parse a non-negative decimal string such as `"2000.12500000"` into
/// fixed-point units with `decimals` places.
///
/// Returns `None` for signs, exponents, non-digits, more fractional digits
/// than `decimals`, or values past 256 bits.
pub fn decimal_str_to_units(text: &str, decimals: u8) -> Option<U256> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
        return None;
    }
    if frac.len() > decimals as usize {
        return None;
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole_units = U256::from_str_radix(whole, 10).ok()?.checked_mul(scale)?;
    let frac_units = if frac.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        U256::from_str_radix(&padded, 10).ok()?
    };
    whole_units.checked_add(frac_units)
}
