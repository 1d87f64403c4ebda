use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// An amount of euros held as whole cents.
///
/// Every stored amount, aggregate and budget ceiling goes through this type so
/// that totals are exact. Shares and percentages are derived in `f64` from the
/// cent value only when displayed or compared.
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping, so a history
/// can never turn a large expense total into a negative one.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let rent: MoneyCents = "850,5".parse().unwrap();
/// assert_eq!(rent.cents(), 85_050);
/// assert_eq!(rent.to_string(), "€850.50");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest amount a single transaction may carry: ten billion euros.
    pub const MAX_AMOUNT: MoneyCents = MoneyCents(1_000_000_000_000);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// `1234` cents reads as `12.34`.
    #[must_use]
    pub fn as_units(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        *self = *self + rhs;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}€{}.{:02}", cents / 100, cents % 100)
    }
}

fn digits(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Reads `12`, `12.5`, `12,50` or `-3.1`; at most two decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::InvalidAmount(format!("{reason}: {:?}", s.trim()));

        let text = s.trim();
        let (negative, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        if text.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (whole, fraction) = text
            .split_once(['.', ','])
            .unwrap_or((text, ""));
        let whole = digits(whole).ok_or_else(|| invalid("invalid amount"))?;
        let fraction = match fraction.len() {
            0 => 0,
            1 => digits(fraction).ok_or_else(|| invalid("invalid amount"))? * 10,
            2 => digits(fraction).ok_or_else(|| invalid("invalid amount"))?,
            _ => return Err(invalid("too many decimals")),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .ok_or_else(|| invalid("amount too large"))?;
        Ok(MoneyCents(if negative { -cents } else { cents }))
    }
}
