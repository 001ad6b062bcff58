//! Per-bucket candle aggregation

use crate::format::LabelFormatter;
use crate::intervals::{Interval, time_from_tick_index};
use crate::tick::Granularity;
use chart_common::constants::{CRYPTO_EXPONENT, FIAT_EXPONENT, FIAT_PRICE_DECIMALS};
use chart_common::{Px, Qty, Ts, Vol, math};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Aggregated candle for one chart bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleData {
    /// Bucket index within the generated window
    pub tick: usize,
    /// Price of the earliest trade in the bucket
    pub open: Px,
    /// Price of the latest trade in the bucket
    pub close: Px,
    /// Highest trade price in the bucket
    pub high: Px,
    /// Lowest trade price in the bucket
    pub low: Px,
    /// Volume-weighted average price
    pub average_price: Px,
    /// Median trade price
    pub median_price: Px,
    /// Sum of trade amounts
    pub accumulated_amount: Qty,
    /// Sum of trade volumes
    pub accumulated_volume: Vol,
    /// Number of trades in the bucket
    pub num_trades: usize,
    /// Whether the bucket closed in the rising direction for its currency
    /// class (inverted for cryptocurrencies)
    pub is_bullish: bool,
    /// Human-readable label spanning this bucket's start to the next one's
    pub date_label: String,
    /// Volume estimate in whole USD; fractional units discarded
    pub volume_in_usd: i64,
}

/// Aggregates the trades of one bucket into [`CandleData`].
///
/// Holds the per-run invariants (granularity, currency class, zone,
/// formatter) so per-bucket calls only carry the bucket itself.
pub struct CandleAggregator<'a, Tz: TimeZone> {
    granularity: Granularity,
    is_crypto: bool,
    formatter: &'a dyn LabelFormatter,
    tz: &'a Tz,
}

impl<'a, Tz: TimeZone> CandleAggregator<'a, Tz> {
    /// Create an aggregator for one chart recomputation
    #[must_use]
    pub fn new(
        granularity: Granularity,
        is_crypto: bool,
        formatter: &'a dyn LabelFormatter,
        tz: &'a Tz,
    ) -> Self {
        Self {
            granularity,
            is_crypto,
            formatter,
            tz,
        }
    }

    /// Aggregate one non-empty bucket.
    ///
    /// `average_usd_price` is the carry-forward-resolved USD reference price
    /// for this bucket; `intervals` supplies the label boundary of the next
    /// bucket.
    #[must_use]
    pub fn aggregate(
        &self,
        tick_index: usize,
        interval: &Interval,
        average_usd_price: Px,
        intervals: &[Interval],
    ) -> CandleData {
        let trades = &interval.trades;

        let mut accumulated_amount = 0i64;
        let mut accumulated_volume = 0i64;
        let mut prices: Vec<i64> = Vec::with_capacity(trades.len());
        for trade in trades {
            accumulated_amount += trade.amount.as_i64();
            accumulated_volume += trade.volume.as_i64();
            prices.push(trade.price.as_i64());
        }

        // Bucket members are in trade-time order, so open/close are the ends
        let open = trades.first().map_or(Px::ZERO, |t| t.price);
        let close = trades.last().map_or(Px::ZERO, |t| t.price);
        let high = prices.iter().copied().max().map_or(Px::ZERO, Px::from_i64);
        let low = prices.iter().copied().min().map_or(Px::ZERO, Px::from_i64);

        prices.sort_unstable();
        let median_price = median(&prices);

        // The averaging exponent follows whichever side carries the
        // smallest-unit scale for the currency class; the bullish direction
        // is inverted for cryptocurrencies.
        let (is_bullish, average_price) = if self.is_crypto {
            let average = math::div_round(
                math::scale_up_pow10(accumulated_amount, CRYPTO_EXPONENT),
                accumulated_volume as i128,
            );
            (close < open, Px::from_i64(average))
        } else {
            let average = math::div_round(
                math::scale_up_pow10(accumulated_volume, FIAT_EXPONENT),
                accumulated_amount as i128,
            );
            (close > open, Px::from_i64(average))
        };

        let date_from = time_from_tick_index(tick_index, intervals);
        let date_to = time_from_tick_index(tick_index + 1, intervals);
        let date_label = self.date_label(date_from, date_to);

        // No precision is needed on the USD estimate, so both factors are
        // scaled down before the multiplication to keep the product within
        // i64, and the result once more to whole USD.
        let usd_price = math::scale_down_pow10(average_usd_price.as_i64(), FIAT_PRICE_DECIMALS);
        let scaled_amount = math::scale_down_pow10(accumulated_amount, FIAT_PRICE_DECIMALS);
        let volume_in_usd = math::scale_down_pow10(usd_price * scaled_amount, FIAT_PRICE_DECIMALS);

        CandleData {
            tick: tick_index,
            open,
            close,
            high,
            low,
            average_price,
            median_price,
            accumulated_amount: Qty::from_i64(accumulated_amount),
            accumulated_volume: Vol::from_i64(accumulated_volume),
            num_trades: trades.len(),
            is_bullish,
            date_label,
            volume_in_usd,
        }
    }

    fn date_label(&self, from: Ts, to: Ts) -> String {
        let from = self.localize(from);
        let to = self.localize(to);
        if self.granularity < Granularity::Day {
            self.formatter.date_time_span(from, to)
        } else {
            format!("{} - {}", self.formatter.date(from), self.formatter.date(to))
        }
    }

    fn localize(&self, ts: Ts) -> NaiveDateTime {
        self.tz
            .timestamp_millis_opt(ts.as_millis())
            .earliest()
            .map_or_else(|| DateTime::UNIX_EPOCH.naive_utc(), |dt| dt.naive_local())
    }
}

fn median(sorted_prices: &[i64]) -> Px {
    if sorted_prices.is_empty() {
        return Px::ZERO;
    }
    let mid = sorted_prices.len() / 2;
    if sorted_prices.len() % 2 == 1 {
        Px::from_i64(sorted_prices[mid])
    } else {
        let sum = i128::from(sorted_prices[mid - 1]) + i128::from(sorted_prices[mid]);
        Px::from_i64(math::div_round(sum, 2))
    }
}
