//! Core market types for chart aggregation

use crate::constants::{PX_SCALE, QTY_SCALE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in the smallest price unit (stored as i64 for determinism).
///
/// Fiat-quoted prices carry 4 decimal places, crypto-quoted prices 8; the
/// exponent is a property of the currency class, not of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Px(i64);

impl Px {
    /// Zero price
    pub const ZERO: Self = Self(0);

    /// Create from raw smallest price units
    #[must_use]
    pub const fn from_i64(units: i64) -> Self {
        Self(units)
    }

    /// Get raw smallest price units
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Check if the price is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Px {
    // Logging convenience only; assumes the fiat 4-decimal convention
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PX_SCALE;
        let frac = (self.0 % PX_SCALE).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Trade amount in the base asset's smallest unit (8 decimal places).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qty(i64);

impl Qty {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from raw smallest units
    #[must_use]
    pub const fn from_i64(units: i64) -> Self {
        Self(units)
    }

    /// Get raw smallest units
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts (fixed-point arithmetic)
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / QTY_SCALE;
        let frac = (self.0 % QTY_SCALE).abs();
        write!(f, "{whole}.{frac:08}")
    }
}

/// Trade volume (price × amount) in the quote currency's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vol(i64);

impl Vol {
    /// Zero volume
    pub const ZERO: Self = Self(0);

    /// Create from raw smallest quote units
    #[must_use]
    pub const fn from_i64(units: i64) -> Self {
        Self(units)
    }

    /// Get raw smallest quote units
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Check if the volume is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two volumes (fixed-point arithmetic)
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl fmt::Display for Vol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PX_SCALE;
        let frac = (self.0 % PX_SCALE).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Timestamp in milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ts(i64);

impl Ts {
    /// Epoch timestamp
    pub const ZERO: Self = Self(0);

    /// Get current timestamp
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| std::time::Duration::from_secs(0));
        // SAFETY: millisecond timestamps fit in i64 for ~292 million years
        Self(duration.as_millis() as i64)
    }

    /// Create from milliseconds since the epoch
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Get milliseconds since the epoch
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Timestamp `millis` earlier than this one
    #[must_use]
    pub const fn minus_millis(&self, millis: i64) -> Self {
        Self(self.0 - millis)
    }
}

impl fmt::Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Currency code of a traded pair's quote side, e.g. "USD" or "XMR".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new code; normalized to upper case
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.to_ascii_uppercase())
    }

    /// Get the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the US dollar code
    #[must_use]
    pub fn is_usd(&self) -> bool {
        self.0 == "USD"
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single trade observation. The aggregation core only reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Trade price in the smallest price unit
    pub price: Px,
    /// Trade amount in the base asset's smallest unit
    pub amount: Qty,
    /// Trade volume (price × amount) in the quote currency's smallest unit
    pub volume: Vol,
    /// Trade time
    pub ts: Ts,
    /// Quote currency of the trade
    pub currency: CurrencyCode,
}

impl TradeRecord {
    /// Create a new trade record
    #[must_use]
    pub const fn new(price: Px, amount: Qty, volume: Vol, ts: Ts, currency: CurrencyCode) -> Self {
        Self {
            price,
            amount,
            volume,
            ts,
            currency,
        }
    }
}
