use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::{debug, warn};

static NON_NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("Invalid non-numeric regex"));

/// Round half away from zero, matching how prices are displayed on the storefront.
pub fn round_price(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Full-width digits and decimal point (`１２３．５`) as their ASCII forms.
fn to_ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// Parse a scraped price label such as `¥1,234.50` into a rounded decimal.
///
/// Full-width digits are folded to ASCII, then everything except `0-9` and
/// `.` is dropped. Text that still does not
/// parse yields zero.
pub fn parse_price(price_text: &str, precision: u32) -> Decimal {
    let ascii = to_ascii_digits(price_text);
    let numeric = NON_NUMERIC_REGEX.replace_all(&ascii, "");
    if numeric.is_empty() {
        debug!("No digits in price text {:?}", price_text);
        return Decimal::ZERO;
    }

    match Decimal::from_str(&numeric) {
        Ok(value) => round_price(value, precision),
        Err(e) => {
            warn!("Failed to parse price text {:?}: {}", price_text, e);
            Decimal::ZERO
        }
    }
}

/// Render a price with exactly `precision` decimals, e.g. `12.5` -> `12.50`.
pub fn format_price(value: Decimal, precision: u32) -> String {
    format!("{:.*}", precision as usize, round_price(value, precision))
}
