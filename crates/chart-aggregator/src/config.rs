//! Chart aggregator configuration

use chart_common::constants::DEFAULT_MAX_TICKS;
use serde::{Deserialize, Serialize};

/// Chart aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Number of displayable chart ticks; the generated window holds
    /// `max_ticks + 2` buckets (a boundary sentinel at each end)
    pub max_ticks: usize,

    /// Validate ascending trade order before assignment instead of trusting
    /// the caller's precondition (slower; for defensive builds)
    pub validate_sort_order: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_ticks: DEFAULT_MAX_TICKS,
            validate_sort_order: false,
        }
    }
}
