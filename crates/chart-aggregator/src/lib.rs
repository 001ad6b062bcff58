//! Trade Chart Aggregation Core
//!
//! Converts a snapshot of timestamped trades into fixed-width time buckets
//! and produces the series a candlestick charting surface needs:
//! - OHLC candles with volume-weighted average and median prices
//! - Per-bucket accumulated amount and volume
//! - A USD-denominated volume estimate backed by a USD reference price table
//!
//! The core recomputes from a snapshot on every run; rendering, UI wiring,
//! display localization and currency metadata stay with the embedding
//! application behind the [`LabelFormatter`] and [`CurrencyClassifier`]
//! seams.

pub mod aggregators;
pub mod config;
pub mod currency;
pub mod format;
pub mod intervals;
pub mod tick;

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chart_common::{ChartError, CurrencyCode, Px, TradeRecord, Ts};
use chrono::TimeZone;
pub use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use aggregators::{CandleAggregator, CandleData, UsdPriceTable};
pub use config::ChartConfig;
pub use currency::{CurrencyClassifier, StaticCurrencyClassifier};
pub use format::{LabelFormatter, PlainLabelFormatter};
pub use intervals::{
    Interval, assign_trades, assign_trades_checked, generate_intervals, previous_tick_start,
    time_from_tick_index,
};
pub use tick::{Granularity, round_to_tick};

/// One point of a chart series: bucket index, metric value, owning candle.
#[derive(Debug, Clone)]
pub struct ChartPoint {
    /// Bucket index within the generated window
    pub tick: usize,
    /// Metric value in raw smallest units
    pub value: i64,
    /// The candle the value was read from
    pub candle: Arc<CandleData>,
}

/// Full output of one chart recomputation.
#[derive(Debug, Clone)]
pub struct UpdateChartResult {
    /// The generated window, empty buckets included, ordered by start
    pub items_per_interval: Vec<Interval>,
    /// Price series (value = open), ordered by tick ascending
    pub price_items: Vec<ChartPoint>,
    /// Volume series (value = accumulated amount), ordered by tick ascending
    pub volume_items: Vec<ChartPoint>,
    /// USD volume series (value = whole-USD estimate), ordered by tick
    pub volume_in_usd_items: Vec<ChartPoint>,
}

/// Chart aggregation service.
///
/// Stateless between runs: every [`update_chart`](Self::update_chart) call
/// receives an immutable trade snapshot and returns a freshly constructed
/// result. The zone is injected at construction so tests can pin a fixed
/// one.
pub struct ChartAggregatorService<Tz> {
    config: ChartConfig,
    tz: Tz,
    classifier: Arc<dyn CurrencyClassifier>,
    formatter: Arc<dyn LabelFormatter>,
}

impl<Tz: fmt::Debug> fmt::Debug for ChartAggregatorService<Tz> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartAggregatorService")
            .field("config", &self.config)
            .field("tz", &self.tz)
            .finish_non_exhaustive()
    }
}

impl<Tz> ChartAggregatorService<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    /// Create a new service with explicit collaborators
    #[must_use]
    pub fn new(
        config: ChartConfig,
        tz: Tz,
        classifier: Arc<dyn CurrencyClassifier>,
        formatter: Arc<dyn LabelFormatter>,
    ) -> Self {
        Self {
            config,
            tz,
            classifier,
            formatter,
        }
    }

    /// Create a service with default config, no known cryptocurrencies and
    /// the locale-free label formatter
    #[must_use]
    pub fn with_defaults(tz: Tz) -> Self {
        Self::new(
            ChartConfig::default(),
            tz,
            Arc::new(StaticCurrencyClassifier::default()),
            Arc::new(PlainLabelFormatter),
        )
    }

    /// Recompute the chart for the window ending now.
    pub async fn update_chart(
        &self,
        trades: Arc<Vec<TradeRecord>>,
        granularity: Granularity,
        currency: CurrencyCode,
        show_all_currencies: bool,
    ) -> Result<UpdateChartResult> {
        self.update_chart_at(
            Ts::now(),
            trades,
            granularity,
            currency,
            show_all_currencies,
            CancellationToken::new(),
        )
        .await
    }

    /// Recompute the chart for the window ending at `now`, abandoning the
    /// run with [`ChartError::Cancelled`] once `cancel` fires.
    ///
    /// The USD reference table build and the currency filter run as two
    /// concurrent background units; both must complete before the dependent
    /// bucketing/aggregation unit starts. Nothing blocks the caller's
    /// thread.
    pub async fn update_chart_at(
        &self,
        now: Ts,
        trades: Arc<Vec<TradeRecord>>,
        granularity: Granularity,
        currency: CurrencyCode,
        show_all_currencies: bool,
        cancel: CancellationToken,
    ) -> Result<UpdateChartResult> {
        debug!(
            trades = trades.len(),
            ?granularity,
            currency = %currency,
            show_all_currencies,
            "starting chart update"
        );

        let usd_task = {
            let trades = Arc::clone(&trades);
            let tz = self.tz.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || -> Result<UsdPriceTable, ChartError> {
                if cancel.is_cancelled() {
                    return Err(ChartError::Cancelled);
                }
                Ok(UsdPriceTable::build(&trades, &tz))
            })
        };

        let filter_task = {
            let trades = Arc::clone(&trades);
            let currency = currency.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || -> Result<Vec<TradeRecord>, ChartError> {
                if cancel.is_cancelled() {
                    return Err(ChartError::Cancelled);
                }
                Ok(trades
                    .iter()
                    .filter(|t| show_all_currencies || t.currency == currency)
                    .cloned()
                    .collect())
            })
        };

        let (usd_table, filtered) = {
            let (usd_res, filter_res) = tokio::try_join!(usd_task, filter_task)
                .context("chart update background unit panicked")?;
            (usd_res?, filter_res?)
        };
        debug!(
            filtered = filtered.len(),
            priced_buckets = usd_table.len(granularity),
            "chart update inputs ready"
        );

        let is_crypto = self.classifier.is_crypto(&currency);
        let config = self.config.clone();
        let tz = self.tz.clone();
        let formatter = Arc::clone(&self.formatter);
        let result = tokio::task::spawn_blocking(move || {
            build_update_chart_result(
                now,
                &filtered,
                granularity,
                &usd_table,
                is_crypto,
                formatter.as_ref(),
                &tz,
                &config,
                &cancel,
            )
        })
        .await
        .context("chart aggregation unit panicked")??;

        info!(
            ?granularity,
            currency = %currency,
            candles = result.price_items.len(),
            "chart update complete"
        );
        Ok(result)
    }
}

/// Synchronous core of one chart recomputation: interval generation, bucket
/// assignment, candle aggregation with USD carry-forward, series assembly.
#[allow(clippy::too_many_arguments)]
fn build_update_chart_result<Tz: TimeZone>(
    now: Ts,
    trades: &[TradeRecord],
    granularity: Granularity,
    usd_table: &UsdPriceTable,
    is_crypto: bool,
    formatter: &dyn LabelFormatter,
    tz: &Tz,
    config: &ChartConfig,
    cancel: &CancellationToken,
) -> Result<UpdateChartResult, ChartError> {
    if cancel.is_cancelled() {
        return Err(ChartError::Cancelled);
    }
    let mut intervals = generate_intervals(now, granularity, tz, config.max_ticks);

    if config.validate_sort_order {
        assign_trades_checked(&mut intervals, trades, config.max_ticks)?;
    } else {
        assign_trades(&mut intervals, trades, config.max_ticks);
    }

    if cancel.is_cancelled() {
        return Err(ChartError::Cancelled);
    }
    let aggregator = CandleAggregator::new(granularity, is_crypto, formatter, tz);
    // Buckets are visited in window order, so candles come out sorted by
    // tick; a missing USD price reuses the previously resolved one.
    let mut average_usd_price = Px::ZERO;
    let mut candles: Vec<Arc<CandleData>> = Vec::new();
    for (tick_index, interval) in intervals.iter().enumerate() {
        if interval.is_empty() {
            continue;
        }
        if let Some(price) = usd_table.average_price(granularity, interval.start) {
            average_usd_price = price;
        }
        candles.push(Arc::new(aggregator.aggregate(
            tick_index,
            interval,
            average_usd_price,
            &intervals,
        )));
    }

    if cancel.is_cancelled() {
        return Err(ChartError::Cancelled);
    }
    let price_items = series(&candles, |c| c.open.as_i64());
    let volume_items = series(&candles, |c| c.accumulated_amount.as_i64());
    let volume_in_usd_items = series(&candles, |c| c.volume_in_usd);
    debug!(
        buckets = intervals.len(),
        candles = candles.len(),
        "assembled chart series"
    );

    Ok(UpdateChartResult {
        items_per_interval: intervals,
        price_items,
        volume_items,
        volume_in_usd_items,
    })
}

fn series(candles: &[Arc<CandleData>], value: impl Fn(&CandleData) -> i64) -> Vec<ChartPoint> {
    candles
        .iter()
        .map(|candle| ChartPoint {
            tick: candle.tick,
            value: value(candle),
            candle: Arc::clone(candle),
        })
        .collect()
}
