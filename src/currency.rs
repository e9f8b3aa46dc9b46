//! ISO 4217 currency table

use serde::{Deserialize, Serialize};

/// A currency entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Currency {
    pub name: String,
    pub alpha3: String,
    pub numeric: String,
    /// Number of minor-unit digits
    pub exp: u8,
}

/// (name, alpha3, numeric, exp)
const CURRENCIES: &[(&str, &str, &str, u8)] = &[
    ("Australian dollar", "AUD", "036", 2),
    ("Brazilian real", "BRL", "986", 2),
    ("Canadian dollar", "CAD", "124", 2),
    ("Swiss franc", "CHF", "756", 2),
    ("Renminbi", "CNY", "156", 2),
    ("Czech koruna", "CZK", "203", 2),
    ("Danish krone", "DKK", "208", 2),
    ("Euro", "EUR", "978", 2),
    ("Pound sterling", "GBP", "826", 2),
    ("Hong Kong dollar", "HKD", "344", 2),
    ("Indian rupee", "INR", "356", 2),
    ("Japanese yen", "JPY", "392", 0),
    ("South Korean won", "KRW", "410", 0),
    ("Kuwaiti dinar", "KWD", "414", 3),
    ("Mexican peso", "MXN", "484", 2),
    ("Norwegian krone", "NOK", "578", 2),
    ("New Zealand dollar", "NZD", "554", 2),
    ("Polish zloty", "PLN", "985", 2),
    ("Russian ruble", "RUB", "643", 2),
    ("Swedish krona", "SEK", "752", 2),
    ("Singapore dollar", "SGD", "702", 2),
    ("Ukrainian hryvnia", "UAH", "980", 2),
    ("United States dollar", "USD", "840", 2),
    ("South African rand", "ZAR", "710", 2),
];

/// Lookup table of currencies by alphabetic or numeric code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iso4217 {
    currencies: Vec<Currency>,
}

impl Default for Iso4217 {
    fn default() -> Self {
        Self::new(
            CURRENCIES
                .iter()
                .map(|(name, alpha3, numeric, exp)| Currency {
                    name: name.to_string(),
                    alpha3: alpha3.to_string(),
                    numeric: numeric.to_string(),
                    exp: *exp,
                })
                .collect(),
        )
    }
}

impl Iso4217 {
    pub fn new(currencies: Vec<Currency>) -> Self {
        Self { currencies }
    }

    /// Find by alpha-3 (case-insensitive) or numeric code
    pub fn find(&self, code: &str) -> Option<&Currency> {
        let code = code.trim();
        if code.chars().all(|c| c.is_ascii_digit()) {
            return self.currencies.iter().find(|c| c.numeric == code);
        }
        self.currencies
            .iter()
            .find(|c| c.alpha3.eq_ignore_ascii_case(code))
    }

    pub fn all(&self) -> &[Currency] {
        &self.currencies
    }
}
