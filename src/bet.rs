//! Bet token parsing
//!
//! Turns user input such as `500`, `2.5k`, `1m` or `max` into a stake bounded
//! by the caller's balance. Parsing never fails loudly: anything unusable
//! comes back as `0`, and callers reject stakes below 1.

/// Tokens that wager the whole balance
const ALL_IN_ALIASES: [&str; 4] = ["max", "m", "all", "allin"];

/// Magnitude for a trailing shorthand suffix
fn suffix_magnitude(suffix: char) -> Option<f64> {
    let magnitude = match suffix {
        'k' => 1e3,
        'm' => 1e6,
        'g' => 1e9,
        't' => 1e12,
        'p' => 1e15,
        'e' => 1e18,
        'z' => 1e21,
        'y' => 1e24,
        _ => return None,
    };
    Some(magnitude)
}

/// Parse a bet token against the available balance.
///
/// Returns a value in `0..=available_cash` (or `0` when `available_cash` is
/// negative).
pub fn parse_bet(raw: &str, available_cash: i64) -> i64 {
    let token = raw.trim().to_lowercase();

    if ALL_IN_ALIASES.contains(&token.as_str()) {
        return available_cash.max(0);
    }

    let amount = match token.chars().last() {
        Some(last) => match suffix_magnitude(last) {
            Some(magnitude) => parse_decimal(&token[..token.len() - last.len_utf8()])
                .map(|number| number * magnitude),
            None => parse_decimal(&token),
        },
        None => None,
    };

    match amount {
        Some(amount) => clamp_stake(amount, available_cash),
        None => 0,
    }
}

/// Plain decimal (integer or fractional) with no exponent or special values
fn parse_decimal(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    let well_formed = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return None;
    }
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Truncate toward zero and bound to `0..=available_cash`
fn clamp_stake(amount: f64, available_cash: i64) -> i64 {
    let ceiling = available_cash.max(0);
    let truncated = amount.trunc();
    if truncated <= 0.0 {
        0
    } else if truncated >= ceiling as f64 {
        ceiling
    } else {
        truncated as i64
    }
}
