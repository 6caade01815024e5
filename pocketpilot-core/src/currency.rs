//! Supported currencies and display formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
    Cad,
    Aud,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Inr,
        Currency::Cad,
        Currency::Aud,
        Currency::Jpy,
    ];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Inr => "₹",
            Currency::Cad => "CA$",
            Currency::Aud => "A$",
            Currency::Jpy => "¥",
        }
    }

    pub fn fraction_digits(&self) -> usize {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Map a user/config supplied code onto a supported currency.
    /// Missing or unknown codes fall back to USD.
    pub fn normalize(code: Option<&str>) -> Currency {
        let Some(code) = code else {
            return Currency::Usd;
        };
        let wanted = code.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .unwrap_or(Currency::Usd)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Format an amount for display: "$1,234.50", "-$5.00", "¥1,200".
pub fn format_currency(amount: f64, currency: Currency) -> String {
    let digits = currency.fraction_digits();
    let fixed = format!("{:.*}", digits, amount.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    match frac {
        Some(frac) => format!("{sign}{}{grouped}.{frac}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_currency(45.0, Currency::Usd), "$45.00");
        assert_eq!(format_currency(1234.5, Currency::Usd), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0, Currency::Usd), "$1,000,000.00");
        assert_eq!(format_currency(-5.0, Currency::Usd), "-$5.00");
    }

    #[test]
    fn test_format_without_fraction() {
        assert_eq!(format_currency(1200.4, Currency::Jpy), "¥1,200");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_currency(-0.001, Currency::Eur), "€0.00");
    }

    #[test]
    fn test_normalize_currency_code() {
        assert_eq!(Currency::normalize(Some(" eur ")), Currency::Eur);
        assert_eq!(Currency::normalize(Some("XYZ")), Currency::Usd);
        assert_eq!(Currency::normalize(None), Currency::Usd);
    }

    #[test]
    fn test_currency_serde_uses_codes() {
        let json = serde_json::to_string(&Currency::Gbp).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str("\"INR\"").unwrap();
        assert_eq!(back, Currency::Inr);
    }
}
