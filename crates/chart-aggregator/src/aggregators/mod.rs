//! Aggregation stages

pub mod candle;
pub mod usd_price;

pub use candle::{CandleAggregator, CandleData};
pub use usd_price::UsdPriceTable;
