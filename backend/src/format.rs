//! en-US display formatting shared by the attestation messages and the catalog.

use chrono::DateTime;

/// Formats a number the way en-US locale output does: thousands grouped with
/// commas, at most three fraction digits, trailing zeros dropped.
pub fn locale_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = group_thousands(int_part);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    if value < 0.0 && out != "0" {
        out.insert(0, '-');
    }
    out
}

/// Whole-dollar USD amount, e.g. `$2,500,000`.
pub fn format_price(value: f64) -> String {
    let rounded = value.abs().round();
    let body = group_thousands(&format!("{:.0}", rounded));
    if value < 0.0 && rounded > 0.0 {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Shortens an account address to `0x1234...abcd`.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// `Jan 15, 2024`. Unparseable timestamps are shown as stored.
pub fn format_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(locale_number(1_000_000.0), "1,000,000");
        assert_eq!(locale_number(950.0), "950");
        assert_eq!(locale_number(1000.0), "1,000");
        assert_eq!(locale_number(0.0), "0");
    }

    #[test]
    fn keeps_up_to_three_fraction_digits() {
        assert_eq!(locale_number(1234.5), "1,234.5");
        assert_eq!(locale_number(1000.0 / 3.0), "333.333");
        assert_eq!(locale_number(-2000.25), "-2,000.25");
    }

    #[test]
    fn prices_are_whole_dollars() {
        assert_eq!(format_price(2_500_000.0), "$2,500,000");
        assert_eq!(format_price(1999.6), "$2,000");
        assert_eq!(format_price(-15.0), "-$15");
    }

    #[test]
    fn shortens_addresses() {
        assert_eq!(
            format_address("0x52908400098527886E0F7030069857D2E4169EE7"),
            "0x5290...9EE7"
        );
        assert_eq!(format_address("0xabc"), "0xabc");
    }

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_date("2024-01-15T10:00:00Z"), "Jan 15, 2024");
        assert_eq!(format_date("2024-02-01T09:15:00.000Z"), "Feb 1, 2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
