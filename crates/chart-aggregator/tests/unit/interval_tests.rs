//! Interval window generation and bucket assignment tests

use chart_aggregator::{
    Granularity, Interval, assign_trades, assign_trades_checked, generate_intervals,
    time_from_tick_index,
};
use chart_common::{ChartError, Ts};
use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::*;
use test_utils::{trade, utc_ts};

const MAX_TICKS: usize = 90;

#[fixture]
fn now() -> Ts {
    utc_ts(2024, 7, 10, 15, 0, 0)
}

#[rstest]
#[case::ten_minutes(Granularity::TenMinutes)]
#[case::hour(Granularity::Hour)]
#[case::day(Granularity::Day)]
#[case::week(Granularity::Week)]
#[case::month(Granularity::Month)]
#[case::year(Granularity::Year)]
fn test_window_size_and_strict_ordering(now: Ts, #[case] granularity: Granularity) {
    let intervals = generate_intervals(now, granularity, &Utc, MAX_TICKS);
    assert_eq!(intervals.len(), MAX_TICKS + 2);
    for pair in intervals.windows(2) {
        assert!(pair[0].start < pair[1].start);
    }
    assert!(intervals.iter().all(Interval::is_empty));
}

#[rstest]
fn test_day_window_bucket_starts(now: Ts) {
    let intervals = generate_intervals(now, Granularity::Day, &Utc, 3);
    let starts: Vec<Ts> = intervals.iter().map(|interval| interval.start).collect();
    assert_eq!(
        starts,
        vec![
            utc_ts(2024, 7, 6, 0, 0, 0),
            utc_ts(2024, 7, 7, 0, 0, 0),
            utc_ts(2024, 7, 8, 0, 0, 0),
            utc_ts(2024, 7, 9, 0, 0, 0),
            utc_ts(2024, 7, 10, 0, 0, 0),
        ]
    );
}

#[rstest]
fn test_assignment_respects_window(now: Ts) {
    let mut intervals = generate_intervals(now, Granularity::Day, &Utc, 3);
    let trades = vec![
        // Before the backward scan's lower boundary: dropped
        trade("EUR", 90_0000, 100_000_000, utc_ts(2024, 7, 5, 12, 0, 0)),
        // Exactly on a bucket start: not strictly after it, dropped
        trade("EUR", 95_0000, 100_000_000, utc_ts(2024, 7, 7, 0, 0, 0)),
        trade("EUR", 100_0000, 100_000_000, utc_ts(2024, 7, 7, 12, 0, 0)),
        trade("EUR", 105_0000, 100_000_000, utc_ts(2024, 7, 9, 18, 0, 0)),
        // Newer than the newest bucket start: clipped
        trade("EUR", 110_0000, 100_000_000, utc_ts(2024, 7, 10, 12, 0, 0)),
    ];

    assign_trades(&mut intervals, &trades, 3);

    let sizes: Vec<usize> = intervals
        .iter()
        .map(|interval| interval.trades.len())
        .collect();
    assert_eq!(sizes, vec![0, 1, 0, 1, 0]);
    assert_eq!(
        intervals[1].trades[0].ts,
        utc_ts(2024, 7, 7, 12, 0, 0),
        "mid-window trade owns the bucket it is strictly after"
    );
    assert_eq!(intervals[3].trades[0].ts, utc_ts(2024, 7, 9, 18, 0, 0));
}

#[rstest]
fn test_each_trade_lands_in_at_most_one_bucket(now: Ts) {
    let mut intervals = generate_intervals(now, Granularity::Hour, &Utc, MAX_TICKS);
    let trades: Vec<_> = (0..200i64)
        .map(|i| {
            let ts = now.minus_millis((200 - i) * 20 * 60 * 1000);
            trade("EUR", 100_0000 + i, 100_000_000, ts)
        })
        .collect();

    assign_trades(&mut intervals, &trades, MAX_TICKS);

    let assigned: Vec<Ts> = intervals
        .iter()
        .flat_map(|interval| interval.trades.iter().map(|t| t.ts))
        .collect();
    let mut unique = assigned.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(assigned.len(), unique.len(), "no trade appears twice");

    // Every assigned trade sits strictly inside its bucket's half-open range
    for (i, interval) in intervals.iter().enumerate() {
        for t in &interval.trades {
            assert!(t.ts > interval.start);
            if let Some(next) = intervals.get(i + 1) {
                assert!(t.ts <= next.start);
            }
        }
    }
}

#[rstest]
fn test_many_trades_in_one_bucket_keep_order(now: Ts) {
    let mut intervals = generate_intervals(now, Granularity::Day, &Utc, 3);
    let base = utc_ts(2024, 7, 8, 10, 0, 0);
    let trades: Vec<_> = (0..5i64)
        .map(|i| {
            trade(
                "EUR",
                100_0000 + i,
                100_000_000,
                Ts::from_millis(base.as_millis() + i * 1000),
            )
        })
        .collect();

    assign_trades(&mut intervals, &trades, 3);

    let bucket = &intervals[2];
    assert_eq!(bucket.trades.len(), 5);
    assert!(bucket.trades.is_sorted_by_key(|t| t.ts));
}

#[rstest]
fn test_checked_assignment_rejects_unsorted(now: Ts) {
    let mut intervals = generate_intervals(now, Granularity::Day, &Utc, 3);
    let trades = vec![
        trade("EUR", 100_0000, 100_000_000, utc_ts(2024, 7, 9, 12, 0, 0)),
        trade("EUR", 100_0000, 100_000_000, utc_ts(2024, 7, 8, 12, 0, 0)),
    ];

    let result = assign_trades_checked(&mut intervals, &trades, 3);
    assert!(matches!(result, Err(ChartError::UnsortedTrades)));
    assert!(intervals.iter().all(Interval::is_empty));
}

#[rstest]
fn test_checked_assignment_matches_fast_path(now: Ts) {
    let trades = vec![
        trade("EUR", 100_0000, 100_000_000, utc_ts(2024, 7, 7, 12, 0, 0)),
        trade("EUR", 105_0000, 100_000_000, utc_ts(2024, 7, 9, 18, 0, 0)),
    ];

    let mut fast = generate_intervals(now, Granularity::Day, &Utc, 3);
    assign_trades(&mut fast, &trades, 3);

    let mut checked = generate_intervals(now, Granularity::Day, &Utc, 3);
    assign_trades_checked(&mut checked, &trades, 3).expect("sorted input");

    let fast_sizes: Vec<usize> = fast.iter().map(|iv| iv.trades.len()).collect();
    let checked_sizes: Vec<usize> = checked.iter().map(|iv| iv.trades.len()).collect();
    assert_eq!(fast_sizes, checked_sizes);
}

#[rstest]
fn test_time_from_tick_index_bounds(now: Ts) {
    let intervals = generate_intervals(now, Granularity::Day, &Utc, 3);
    assert_eq!(time_from_tick_index(0, &intervals), intervals[0].start);
    assert_eq!(time_from_tick_index(4, &intervals), intervals[4].start);
    assert_eq!(time_from_tick_index(5, &intervals), Ts::ZERO);
}
