//! Shared constants for chart aggregation
//!
//! Single source of truth for fixed-point scales and window sizing.

// Fixed-point arithmetic constants
/// Smallest-unit exponent of cryptocurrency amounts (8 decimal places)
pub const CRYPTO_EXPONENT: u32 = 8;
/// Smallest-unit exponent applied when averaging fiat-quoted volume
pub const FIAT_EXPONENT: u32 = 8;
/// Decimal places carried by fiat prices; also the down-scaling step of the
/// USD volume estimate
pub const FIAT_PRICE_DECIMALS: u32 = 4;
/// Scale factor for fiat price display (4 decimal places)
pub const PX_SCALE: i64 = 10_000;
/// Scale factor for amount display (8 decimal places)
pub const QTY_SCALE: i64 = 100_000_000;

// Time constants
pub const MILLIS_PER_SEC: i64 = 1000;
pub const SECS_PER_MIN: i64 = 60;
pub const MINS_PER_HOUR: i64 = 60;
pub const HOURS_PER_DAY: i64 = 24;
pub const MILLIS_PER_MIN: i64 = MILLIS_PER_SEC * SECS_PER_MIN;
pub const MILLIS_PER_HOUR: i64 = MILLIS_PER_MIN * MINS_PER_HOUR;
pub const MILLIS_PER_DAY: i64 = MILLIS_PER_HOUR * HOURS_PER_DAY;

// Window sizing
/// Default number of displayable chart ticks; the generated window always
/// holds two more buckets than this (boundary sentinels at both ends)
pub const DEFAULT_MAX_TICKS: usize = 90;
