//! Display formatting for money and percentages.

fn currency_prefix(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{other} "),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234.5` in USD renders as `$1,234.50`; negatives as `-$25.00`.
pub fn format_money(value: f64, currency: &str) -> String {
    let prefix = currency_prefix(currency);
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // -0.004 rounds to 0.00 and should not print a sign
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{prefix}{}.{cents}", group_thousands(whole))
}

pub fn format_pct(value: f64) -> String {
    format!("{value:.1}%")
}
