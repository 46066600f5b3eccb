//! Input masks for the payment and contact fields.
//!
//! Each mask keeps only digits from whatever was typed and lays them out in the
//! shape the validator expects, so re-applying a mask is harmless.

const CARD_DIGITS: usize = 16;
const PHONE_DIGITS: usize = 10;

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// `4111111111111111` → `4111 1111 1111 1111`.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = digits(input).chars().take(CARD_DIGITS).collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `0828` → `08/28`. Fewer than two digits are left alone.
pub fn format_expiry_date(input: &str) -> String {
    let digits: String = digits(input).chars().take(4).collect();
    if digits.len() < 2 {
        return digits;
    }
    let (month, year) = digits.split_at(2);
    format!("{month}/{year}")
}

/// Progressive US phone layout: `+1 (555`, `+1 (555) 12`, `+1 (555) 123-4567`.
pub fn format_phone_number(input: &str) -> String {
    let national = input.trim_start().strip_prefix("+1").unwrap_or(input);
    let digits: String = digits(national).chars().take(PHONE_DIGITS).collect();

    match digits.len() {
        0 => String::new(),
        1..=3 => format!("+1 ({digits}"),
        4..=6 => format!("+1 ({}) {}", &digits[..3], &digits[3..]),
        _ => format!("+1 ({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// Strips everything but digits, for the CVV field.
pub fn format_cvv(input: &str) -> String {
    digits(input)
}
