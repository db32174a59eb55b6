//! Display currencies and amount formatting.

use std::fmt::Display;

use clap::ValueEnum;
use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};

/// The currency used when displaying amounts.
///
/// Amounts are stored without a currency; changing the display currency does
/// not convert anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Euro.
    #[default]
    Eur,
    /// Pound sterling.
    Gbp,
    /// United States dollar.
    Usd,
}

impl Currency {
    /// The symbol placed in front of formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Usd => "$",
        }
    }

    /// The ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Format `number` as an amount of `currency` with two decimal places and
/// thousands separators, e.g. "€1,234.50" or "-$45.99".
pub fn format_currency(number: f64, currency: Currency) -> String {
    let symbol = currency.symbol();

    if number == 0.0 {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return format!("{symbol}0.00");
    }

    let prefix = if number < 0.0 {
        format!("-{symbol}")
    } else {
        symbol.to_owned()
    };

    let formatted_string = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(2))
            .fmt_string(number.abs()),
        Err(_) => format!("{prefix}{:.2}", number.abs()),
    };

    pad_decimals(formatted_string)
}

/// numfmt omits trailing zeros, so "12.30" is rendered as "12.3" and "12.00" as "12".
fn pad_decimals(mut formatted_string: String) -> String {
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(dot) => {
            for _ in formatted_string.len() - dot - 1..2 {
                formatted_string.push('0');
            }
        }
    }

    formatted_string
}
