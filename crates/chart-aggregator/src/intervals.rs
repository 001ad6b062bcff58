//! Interval window generation and trade-to-bucket assignment

use crate::tick::{Granularity, round_to_tick};
use chart_common::{ChartError, TradeRecord, Ts};
use chrono::TimeZone;
use serde::{Deserialize, Serialize};

/// A single chart bucket: start timestamp plus the member trades.
///
/// Buckets are created fresh for every recomputation and never overlap;
/// member order follows the assignment order, so it is ascending by
/// timestamp whenever the assignment precondition held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interval {
    /// Bucket lower bound (inclusive)
    pub start: Ts,
    /// Member trades
    pub trades: Vec<TradeRecord>,
}

impl Interval {
    fn empty(start: Ts) -> Self {
        Self {
            start,
            trades: Vec::new(),
        }
    }

    /// Whether the bucket holds no trades
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Start of the bucket immediately preceding the one starting at `start`.
///
/// Pure value-to-value stepping: one time unit below the boundary, rounded
/// down again.
pub fn previous_tick_start<Tz: TimeZone>(start: Ts, granularity: Granularity, tz: &Tz) -> Ts {
    round_to_tick(start.minus_millis(1), granularity, tz)
}

/// Generate the fixed window of `max_ticks + 2` empty buckets ending at the
/// bucket that contains `now`.
///
/// The last bucket's start is `round_to_tick(now)`; every earlier start is
/// obtained by [`previous_tick_start`], so starts are strictly increasing.
pub fn generate_intervals<Tz: TimeZone>(
    now: Ts,
    granularity: Granularity,
    tz: &Tz,
    max_ticks: usize,
) -> Vec<Interval> {
    let mut starts = Vec::with_capacity(max_ticks + 2);
    let mut start = round_to_tick(now, granularity, tz);
    starts.push(start);
    for _ in 0..=max_ticks {
        start = previous_tick_start(start, granularity, tz);
        starts.push(start);
    }
    starts.into_iter().rev().map(Interval::empty).collect()
}

/// Assign each trade to at most one bucket of the generated window.
///
/// Precondition: `trades` is sorted ascending by timestamp. This is a
/// documented contract, not validated here; unsorted input silently corrupts
/// bucket membership. Use [`assign_trades_checked`] when the caller cannot
/// guarantee the order.
///
/// Two-pointer scan, O(n) over sorted input: the cursor starts at the
/// second-to-last bucket, moves forward while the trade is newer than the
/// next bucket's start, then scans backward and assigns at the first bucket
/// whose start the trade is strictly after. The cursor carries over between
/// trades. Trades newer than the newest bucket's start or at-or-below the
/// backward scan's lower boundary are dropped (window clipping).
pub fn assign_trades(intervals: &mut [Interval], trades: &[TradeRecord], max_ticks: usize) {
    debug_assert_eq!(intervals.len(), max_ticks + 2);
    if intervals.len() < 2 {
        return;
    }
    let newest_start = intervals[max_ticks + 1].start;
    let mut i = max_ticks;
    for trade in trades {
        if trade.ts > newest_start {
            continue;
        }
        // Move forwards from the last used tick index if necessary
        while i < max_ticks && trade.ts > intervals[i + 1].start {
            i += 1;
        }
        // Scan backwards until the owning tick is reached
        while i > 0 {
            if trade.ts > intervals[i].start {
                intervals[i].trades.push(trade.clone());
                break;
            }
            i -= 1;
        }
    }
}

/// Validating wrapper around [`assign_trades`] for defensive builds:
/// rejects unsorted input instead of silently corrupting bucket membership.
pub fn assign_trades_checked(
    intervals: &mut [Interval],
    trades: &[TradeRecord],
    max_ticks: usize,
) -> Result<(), ChartError> {
    if !trades.is_sorted_by_key(|t| t.ts) {
        return Err(ChartError::UnsortedTrades);
    }
    assign_trades(intervals, trades, max_ticks);
    Ok(())
}

/// Bucket start for a tick index; indexes outside the window yield the epoch.
#[must_use]
pub fn time_from_tick_index(tick_index: usize, intervals: &[Interval]) -> Ts {
    intervals
        .get(tick_index)
        .map_or(Ts::ZERO, |interval| interval.start)
}
