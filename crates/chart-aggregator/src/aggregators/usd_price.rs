//! USD average-price reference table

use crate::tick::{Granularity, round_to_tick};
use chart_common::constants::FIAT_EXPONENT;
use chart_common::{Px, TradeRecord, Ts, math};
use chrono::TimeZone;
use rustc_hash::FxHashMap;

/// Volume-weighted average USD price per bucket start, per granularity.
///
/// Built over every USD-quoted trade at every supported granularity at once,
/// with no window bound, so the same table can back any chart window. The
/// consumer carries the last resolved price forward when a bucket has no
/// entry.
#[derive(Debug, Clone, Default)]
pub struct UsdPriceTable {
    prices: FxHashMap<Granularity, FxHashMap<Ts, Px>>,
}

impl UsdPriceTable {
    /// Build the table from the full (unfiltered) trade set.
    pub fn build<Tz: TimeZone>(trades: &[TradeRecord], tz: &Tz) -> Self {
        let mut sums: FxHashMap<Granularity, FxHashMap<Ts, (i64, i64)>> = FxHashMap::default();
        for granularity in Granularity::ALL {
            sums.insert(granularity, FxHashMap::default());
        }

        for trade in trades.iter().filter(|t| t.currency.is_usd()) {
            for granularity in Granularity::ALL {
                let start = round_to_tick(trade.ts, granularity, tz);
                if let Some(buckets) = sums.get_mut(&granularity) {
                    let (amount, volume) = buckets.entry(start).or_insert((0, 0));
                    *amount += trade.amount.as_i64();
                    *volume += trade.volume.as_i64();
                }
            }
        }

        let prices = sums
            .into_iter()
            .map(|(granularity, buckets)| {
                let averaged = buckets
                    .into_iter()
                    .filter(|&(_, (amount, _))| amount != 0)
                    .map(|(start, (amount, volume))| {
                        let average = math::div_round(
                            math::scale_up_pow10(volume, FIAT_EXPONENT),
                            amount as i128,
                        );
                        (start, Px::from_i64(average))
                    })
                    .collect();
                (granularity, averaged)
            })
            .collect();

        Self { prices }
    }

    /// Average USD price of the bucket starting at `bucket_start`, if any
    /// USD trade fell into it.
    #[must_use]
    pub fn average_price(&self, granularity: Granularity, bucket_start: Ts) -> Option<Px> {
        self.prices
            .get(&granularity)
            .and_then(|buckets| buckets.get(&bucket_start))
            .copied()
    }

    /// Number of priced buckets at `granularity`
    #[must_use]
    pub fn len(&self, granularity: Granularity) -> usize {
        self.prices.get(&granularity).map_or(0, FxHashMap::len)
    }

    /// Whether no bucket at all resolved to a price
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.values().all(FxHashMap::is_empty)
    }
}
