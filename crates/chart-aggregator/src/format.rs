//! Date-range label formatting seam

use chrono::NaiveDateTime;

/// Renders bucket boundary timestamps for display.
///
/// Localization is owned by the embedding application; the core only decides
/// which shape applies (by granularity) and supplies the two zone-localized
/// boundary timestamps.
pub trait LabelFormatter: Send + Sync {
    /// Render a single date (used for daily and coarser buckets)
    fn date(&self, at: NaiveDateTime) -> String;

    /// Render a continuous date-time span (used for buckets finer than a day)
    fn date_time_span(&self, from: NaiveDateTime, to: NaiveDateTime) -> String;
}

/// Locale-free fallback formatter.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainLabelFormatter;

impl LabelFormatter for PlainLabelFormatter {
    fn date(&self, at: NaiveDateTime) -> String {
        at.format("%Y-%m-%d").to_string()
    }

    fn date_time_span(&self, from: NaiveDateTime, to: NaiveDateTime) -> String {
        format!(
            "{} - {}",
            from.format("%Y-%m-%d %H:%M"),
            to.format("%Y-%m-%d %H:%M")
        )
    }
}
