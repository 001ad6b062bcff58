//! Concurrent recomputation scenarios

use std::sync::Arc;

use anyhow::Result;
use chart_aggregator::{CancellationToken, ChartAggregatorService, Granularity};
use chart_common::{CurrencyCode, Ts};
use chrono::Utc;
use pretty_assertions::assert_eq;
use test_utils::{trade, utc_ts};

fn snapshot() -> Arc<Vec<chart_common::TradeRecord>> {
    let base = utc_ts(2024, 7, 8, 0, 0, 0).as_millis();
    Arc::new(
        (0..48i64)
            .map(|i| {
                trade(
                    "EUR",
                    100_0000 + i * 100,
                    100_000_000,
                    Ts::from_millis(base + i * 30 * 60 * 1000 + 1000),
                )
            })
            .collect(),
    )
}

#[tokio::test]
async fn test_concurrent_updates_share_one_service() -> Result<()> {
    let service = Arc::new(ChartAggregatorService::with_defaults(Utc));
    let now = utc_ts(2024, 7, 10, 15, 0, 0);
    let trades = snapshot();

    let hourly = {
        let service = Arc::clone(&service);
        let trades = Arc::clone(&trades);
        tokio::spawn(async move {
            service
                .update_chart_at(
                    now,
                    trades,
                    Granularity::Hour,
                    CurrencyCode::new("EUR"),
                    false,
                    CancellationToken::new(),
                )
                .await
        })
    };
    let daily = {
        let service = Arc::clone(&service);
        let trades = Arc::clone(&trades);
        tokio::spawn(async move {
            service
                .update_chart_at(
                    now,
                    trades,
                    Granularity::Day,
                    CurrencyCode::new("EUR"),
                    false,
                    CancellationToken::new(),
                )
                .await
        })
    };

    let (hourly, daily) = tokio::try_join!(hourly, daily)?;
    let (hourly, daily) = (hourly?, daily?);

    assert_eq!(hourly.items_per_interval.len(), 92);
    assert_eq!(daily.items_per_interval.len(), 92);
    let hourly_total: usize = hourly.volume_items.iter().map(|p| p.candle.num_trades).sum();
    let daily_total: usize = daily.volume_items.iter().map(|p| p.candle.num_trades).sum();
    assert_eq!(hourly_total, daily_total, "both windows cover every trade");
    Ok(())
}

#[tokio::test]
async fn test_superseded_run_can_be_abandoned() -> Result<()> {
    let service = Arc::new(ChartAggregatorService::with_defaults(Utc));
    let now = utc_ts(2024, 7, 10, 15, 0, 0);
    let trades = snapshot();

    let stale_cancel = CancellationToken::new();
    stale_cancel.cancel();
    let stale = service
        .update_chart_at(
            now,
            Arc::clone(&trades),
            Granularity::Hour,
            CurrencyCode::new("EUR"),
            false,
            stale_cancel,
        )
        .await;
    assert!(stale.is_err());

    // The replacement run is unaffected by the abandoned one
    let fresh = service
        .update_chart_at(
            now,
            trades,
            Granularity::Hour,
            CurrencyCode::new("EUR"),
            false,
            CancellationToken::new(),
        )
        .await?;
    assert!(!fresh.price_items.is_empty());
    Ok(())
}
