//! Currency classification seam

use chart_common::CurrencyCode;
use rustc_hash::FxHashSet;

/// Answers whether a currency code denotes a cryptocurrency.
///
/// Currency metadata is owned by the embedding application; the aggregator
/// only needs the crypto/fiat distinction to pick the averaging exponent and
/// the bullish-flag direction.
pub trait CurrencyClassifier: Send + Sync {
    /// Whether `code` is a cryptocurrency
    fn is_crypto(&self, code: &CurrencyCode) -> bool;
}

/// Classifier backed by a fixed set of cryptocurrency codes.
#[derive(Debug, Default, Clone)]
pub struct StaticCurrencyClassifier {
    crypto_codes: FxHashSet<CurrencyCode>,
}

impl StaticCurrencyClassifier {
    /// Create a classifier that treats exactly `codes` as cryptocurrencies
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = CurrencyCode>) -> Self {
        Self {
            crypto_codes: codes.into_iter().collect(),
        }
    }
}

impl CurrencyClassifier for StaticCurrencyClassifier {
    fn is_crypto(&self, code: &CurrencyCode) -> bool {
        self.crypto_codes.contains(code)
    }
}
