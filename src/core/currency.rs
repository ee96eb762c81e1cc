use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping separator used by French locales (narrow no-break space)
const NARROW_NBSP: char = '\u{202F}';
/// Separator between a French amount and its currency symbol
const NBSP: char = '\u{A0}';

/// Supported display currencies with their decimal precision rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro (2 decimal places)
    EUR,
    /// US Dollar (2 decimal places)
    USD,
    /// Pound Sterling (2 decimal places)
    GBP,
    /// Japanese Yen (no decimal places)
    JPY,
}

impl Currency {
    /// Returns the decimal scale for this currency
    /// - JPY: 0 (no decimals)
    /// - EUR/USD/GBP: 2 (2 decimal places)
    pub fn scale(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            Currency::EUR | Currency::USD | Currency::GBP => 2,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "€",
            Currency::USD => "$",
            Currency::GBP => "£",
            Currency::JPY => "¥",
        }
    }

    /// Rounds a decimal value to the display scale of this currency (half away from zero)
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Formats an amount the way the given locale renders this currency
    ///
    /// - fr-FR: `1 234,50 €` (narrow no-break space grouping, symbol after)
    /// - en-US / en-GB: `€1,234.50` (comma grouping, symbol before)
    pub fn format_amount(&self, amount: Decimal, locale: Locale) -> String {
        let rounded = self.round(amount);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = format!("{:.width$}", rounded.abs(), width = self.scale() as usize);
        let number = locale.localize_number(&digits);
        let sign = if negative { "-" } else { "" };

        match locale {
            Locale::FrFr => format!("{}{}{}{}", sign, number, NBSP, self.symbol()),
            Locale::EnUs | Locale::EnGb => format!("{}{}{}", sign, self.symbol(), number),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::EUR => write!(f, "EUR"),
            Currency::USD => write!(f, "USD"),
            Currency::GBP => write!(f, "GBP"),
            Currency::JPY => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

/// Display locale for amounts and percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
}

impl Locale {
    fn group_separator(&self) -> char {
        match self {
            Locale::FrFr => NARROW_NBSP,
            Locale::EnUs | Locale::EnGb => ',',
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Locale::FrFr => ',',
            Locale::EnUs | Locale::EnGb => '.',
        }
    }

    /// Rewrites an unsigned `1234.5` style string with this locale's separators
    fn localize_number(&self, digits: &str) -> String {
        let (integer, fraction) = match digits.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (digits, None),
        };

        let mut grouped = String::with_capacity(digits.len() + integer.len() / 3);
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(self.group_separator());
            }
            grouped.push(ch);
        }

        if let Some(fraction) = fraction {
            grouped.push(self.decimal_separator());
            grouped.push_str(fraction);
        }
        grouped
    }

    /// Formats a percentage (already multiplied by 100) with one decimal place
    pub fn format_percent(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let sign = if negative { "-" } else { "" };
        self.percent_with_sign(sign, rounded.abs())
    }

    /// Formats a percentage delta; positive deltas carry an explicit `+`
    pub fn format_percent_delta(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_zero() {
            ""
        } else if rounded.is_sign_negative() {
            "-"
        } else {
            "+"
        };
        self.percent_with_sign(sign, rounded.abs())
    }

    fn percent_with_sign(&self, sign: &str, magnitude: Decimal) -> String {
        let number = self.localize_number(&format!("{:.1}", magnitude));
        match self {
            Locale::FrFr => format!("{}{}{}%", sign, number, NARROW_NBSP),
            Locale::EnUs | Locale::EnGb => format!("{}{}%", sign, number),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::FrFr => write!(f, "fr-FR"),
            Locale::EnUs => write!(f, "en-US"),
            Locale::EnGb => write!(f, "en-GB"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").to_lowercase().as_str() {
            "fr-fr" | "fr" => Ok(Locale::FrFr),
            "en-us" | "en" => Ok(Locale::EnUs),
            "en-gb" => Ok(Locale::EnGb),
            _ => Err(format!("Invalid locale: {}", s)),
        }
    }
}

/// Currency and locale pair used to render a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFormat {
    pub currency: Currency,
    pub locale: Locale,
}

impl DisplayFormat {
    pub fn new(currency: Currency, locale: Locale) -> Self {
        Self { currency, locale }
    }

    pub fn money(&self, amount: Decimal) -> String {
        self.currency.format_amount(amount, self.locale)
    }

    pub fn percent(&self, value: Decimal) -> String {
        self.locale.format_percent(value)
    }

    pub fn percent_delta(&self, value: Decimal) -> String {
        self.locale.format_percent_delta(value)
    }
}
