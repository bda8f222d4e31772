//! Display formatting for phone numbers, business numbers and amounts.

/// Keeps only the ASCII digits of `value`.
#[must_use]
pub fn strip_non_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Formats a Korean phone number as the user types it.
///
/// Seoul numbers start with `02` and use a two-digit area code; everything else
/// (mobile, other regions, `070`) uses three. Extra digits are dropped.
#[must_use]
pub fn format_phone(value: &str) -> String {
    let digits = strip_non_digits(value);
    let len = digits.len();
    if len <= 2 {
        return digits;
    }

    if digits.starts_with("02") {
        return match len {
            0..=5 => format!("{}-{}", &digits[..2], &digits[2..]),
            6..=9 => format!("{}-{}-{}", &digits[..2], &digits[2..5], &digits[5..]),
            _ => format!(
                "{}-{}-{}",
                &digits[..2],
                &digits[2..6],
                &digits[6..len.min(10)]
            ),
        };
    }

    match len {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        8..=10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!(
            "{}-{}-{}",
            &digits[..3],
            &digits[3..7],
            &digits[7..len.min(11)]
        ),
    }
}

/// Formats a business registration number as `000-00-00000`.
#[must_use]
pub fn format_business_number(value: &str) -> String {
    let digits = strip_non_digits(value);
    let len = digits.len();
    match len {
        0..=3 => digits,
        4..=5 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!(
            "{}-{}-{}",
            &digits[..3],
            &digits[3..5],
            &digits[5..len.min(10)]
        ),
    }
}

/// Formats a whole-won amount with thousands separators, e.g. `1,234,000원`.
#[must_use]
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped}원")
}

/// Formats free-text amount input; absent or digit-free input renders `0원`.
#[must_use]
pub fn format_currency_input(value: Option<&str>) -> String {
    value
        .map(strip_non_digits)
        .and_then(|digits| digits.parse::<i64>().ok())
        .map_or_else(|| format_currency(0), format_currency)
}
