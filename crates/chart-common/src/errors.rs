//! Error types for chart aggregation

use thiserror::Error;

/// Chart aggregation error types
#[derive(Debug, Error)]
pub enum ChartError {
    /// Trade records handed to the checked assignment path were not sorted
    #[error("trade records must be sorted ascending by timestamp")]
    UnsortedTrades,

    /// The recomputation was cancelled before it completed
    #[error("chart update cancelled")]
    Cancelled,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
