use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO 4217 currency of a debt.
///
/// Debts are bucketed per currency and never netted across currencies, so the
/// set of supported codes is an explicit enum rather than a free-form string.
/// The derived `Ord` lets the simplifier use it as an ordered partition key.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see `Money`). `minor_units()` returns how many decimal digits are used
/// when converting between major units (`10.50 INR`) and minor units
/// (`1050`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
    Aud,
    Cad,
    Sgd,
    Aed,
    Chf,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Inr,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Aud,
        Currency::Cad,
        Currency::Sgd,
        Currency::Aed,
        Currency::Chf,
    ];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Sgd => "SGD",
            Currency::Aed => "AED",
            Currency::Chf => "CHF",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(EngineError::InvalidInput("missing currency".to_string()));
        }
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| EngineError::InvalidInput(format!("unsupported currency: {code}")))
    }
}
