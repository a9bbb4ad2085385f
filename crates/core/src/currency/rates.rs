//! Exchange-rate lookup seam.

use std::collections::HashMap;

use rust_decimal::Decimal;

use remit_shared::types::Currency;

/// Source of exchange rates.
///
/// Rate feeds are an external collaborator; the engine only ever asks for
/// a single pair at submission time.
pub trait RateProvider: Send + Sync {
    /// The value of 1 unit of `from` in units of `to`, if known.
    fn rate(&self, from: Currency, to: Currency) -> Option<Decimal>;
}

/// Static rate table for tests and the dev server.
#[derive(Debug, Default)]
pub struct FixedRates {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl FixedRates {
    /// Creates an empty table. Same-currency pairs always resolve to 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate for a currency pair.
    #[must_use]
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

impl RateProvider for FixedRates {
    fn rate(&self, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.rates.get(&(from, to)).copied()
    }
}
