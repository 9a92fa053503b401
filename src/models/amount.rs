//! Amount type for representing currency amounts
//!
//! Stores whole currency units (i64). The source exports carry no minor
//! units, so there is no fractional part to track.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed monetary amount in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Create an Amount from whole units
    ///
    /// # Examples
    /// ```
    /// use billsplit::models::Amount;
    /// let amount = Amount::new(-3000);
    /// assert_eq!(amount.units(), -3000);
    /// ```
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Create a zero Amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in whole units
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Proportional part of this amount, rounded half away from zero
    ///
    /// Returns zero when `whole` is not positive.
    pub fn proportion(&self, part: f64, whole: f64) -> Self {
        if whole <= 0.0 {
            return Self::zero();
        }
        Self((self.0 as f64 * part / whole).round() as i64)
    }

    /// Parse an amount from export text
    ///
    /// Accepts formats: "3000", "-3,000", "¥1,200", "1200.0", "(500)"
    pub fn parse(s: &str) -> Result<Self, AmountParseError> {
        let original = s;
        let s = s.trim();

        // Accounting negatives: "(500)"
        let (paren_negative, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
            Some(inner) => (true, inner.trim()),
            None => (false, s),
        };

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = s.strip_prefix('\u{2212}') {
            (true, stripped)
        } else {
            (paren_negative, s)
        };

        // Currency symbols and grouping separators
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, '¥' | '￥' | '$' | ',' | ' ' | '円'))
            .collect();

        if cleaned.is_empty() {
            return Err(AmountParseError::InvalidFormat(original.to_string()));
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };

        if !fraction.chars().all(|c| c == '0') {
            return Err(AmountParseError::Fractional(original.to_string()));
        }

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountParseError::InvalidFormat(original.to_string()));
        }

        let units: i64 = whole
            .parse()
            .map_err(|_| AmountParseError::InvalidFormat(original.to_string()))?;

        Ok(Self(if negative { -units } else { units }))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if self.is_negative() {
            write!(f, "-{}", grouped)
        } else {
            write!(f, "{}", grouped)
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, m| acc + m)
    }
}

/// Error type for amount parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    InvalidFormat(String),
    Fractional(String),
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountParseError::InvalidFormat(s) => write!(f, "Invalid amount format: '{}'", s),
            AmountParseError::Fractional(s) => {
                write!(f, "Amount has a fractional part: '{}'", s)
            }
        }
    }
}

impl std::error::Error for AmountParseError {}
