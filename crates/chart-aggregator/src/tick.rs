//! Tick granularities and bucket-start rounding

use chart_common::Ts;
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Chart bucket width, ordered finest to coarsest.
///
/// The derived total order is load-bearing: the candle aggregator compares
/// against [`Granularity::Day`] to select the date-label shape, so variants
/// must stay in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// 10 minute buckets
    TenMinutes,
    /// 1 hour buckets
    Hour,
    /// Daily buckets
    Day,
    /// Weekly buckets (ISO weeks, starting Monday)
    Week,
    /// Monthly buckets
    Month,
    /// Yearly buckets
    Year,
}

impl Granularity {
    /// All supported granularities, finest first
    pub const ALL: [Self; 6] = [
        Self::TenMinutes,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
    ];
}

/// Round `ts` down to the start of its bucket at `granularity`, resolved in
/// the explicit zone `tz`.
///
/// Idempotent (`round(round(t)) == round(t)`) and monotonic. Total: a local
/// time made ambiguous or skipped by an offset transition resolves via the
/// earliest valid mapping, and an unrepresentable input comes back unchanged.
pub fn round_to_tick<Tz: TimeZone>(ts: Ts, granularity: Granularity, tz: &Tz) -> Ts {
    try_round(ts, granularity, tz).unwrap_or(ts)
}

fn try_round<Tz: TimeZone>(ts: Ts, granularity: Granularity, tz: &Tz) -> Option<Ts> {
    let local = tz
        .timestamp_millis_opt(ts.as_millis())
        .earliest()?
        .naive_local();
    let date = local.date();
    let rounded: NaiveDateTime = match granularity {
        Granularity::Year => date.with_ordinal(1)?.and_hms_opt(0, 0, 0)?,
        Granularity::Month => date.with_day(1)?.and_hms_opt(0, 0, 0)?,
        Granularity::Week => {
            // ISO day-of-week 1..7; offset to the Monday of the same week
            let offset = i64::from(date.weekday().num_days_from_monday());
            (date - Duration::days(offset)).and_hms_opt(0, 0, 0)?
        }
        Granularity::Day => date.and_hms_opt(0, 0, 0)?,
        Granularity::Hour => local.with_minute(0)?.with_second(0)?.with_nanosecond(0)?,
        Granularity::TenMinutes => local
            .with_minute(local.minute() - local.minute() % 10)?
            .with_second(0)?
            .with_nanosecond(0)?,
    };
    let at_zone: DateTime<Tz> = rounded.and_local_timezone(tz.clone()).earliest()?;
    Some(Ts::from_millis(at_zone.timestamp_millis()))
}
