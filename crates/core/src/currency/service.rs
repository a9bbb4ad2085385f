//! Currency conversion with Banker's Rounding.

use rust_decimal::prelude::*;

use remit_shared::types::{Currency, Money};

use crate::currency::rates::RateProvider;

/// Currency service for conversion operations.
///
/// Uses `RoundingStrategy::MidpointNearestEven` (Banker's Rounding):
/// - 2.5 → 2 (to nearest even)
/// - 3.5 → 4 (to nearest even)
pub struct CurrencyService;

impl CurrencyService {
    /// Convert an amount using an exchange rate, rounded to 4 decimal
    /// places with Banker's Rounding.
    #[must_use]
    pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
        (amount * rate).round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
    }

    /// Render an amount in the company base currency for display caching.
    ///
    /// A missing rate falls back to the source amount: conversion is a
    /// display concern and must not block a submission over a rate-feed
    /// gap.
    #[must_use]
    pub fn display_amount(provider: &dyn RateProvider, amount: &Money, base: Currency) -> Money {
        if amount.currency == base {
            return *amount;
        }
        match provider.rate(amount.currency, base) {
            Some(rate) => Money::new(Self::convert(amount.amount, rate), base),
            None => Money::new(amount.amount, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::rates::FixedRates;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_basic() {
        assert_eq!(CurrencyService::convert(dec!(100), dec!(1.5)), dec!(150.0000));
    }

    #[test]
    fn test_convert_rounds_to_4_decimals() {
        // 100 * 1.23456789 = 123.456789 → rounds to 123.4568
        assert_eq!(
            CurrencyService::convert(dec!(100), dec!(1.23456789)),
            dec!(123.4568)
        );
    }

    #[test]
    fn test_bankers_rounding_midpoint_to_even() {
        // 2.00005 at 4 dp: midpoint rounds to even neighbor 2.0000
        assert_eq!(CurrencyService::convert(dec!(2.00005), Decimal::ONE), dec!(2.0000));
        // 2.00015 → 2.0002
        assert_eq!(CurrencyService::convert(dec!(2.00015), Decimal::ONE), dec!(2.0002));
    }

    #[test]
    fn test_display_amount_same_currency() {
        let rates = FixedRates::new();
        let money = Money::new(dec!(42), Currency::Usd);
        assert_eq!(
            CurrencyService::display_amount(&rates, &money, Currency::Usd),
            money
        );
    }

    #[test]
    fn test_display_amount_converts() {
        let rates = FixedRates::new().with_rate(Currency::Eur, Currency::Usd, dec!(1.1));
        let money = Money::new(dec!(100), Currency::Eur);
        let display = CurrencyService::display_amount(&rates, &money, Currency::Usd);
        assert_eq!(display, Money::new(dec!(110.0000), Currency::Usd));
    }

    #[test]
    fn test_display_amount_falls_back_without_rate() {
        let rates = FixedRates::new();
        let money = Money::new(dec!(100), Currency::Gbp);
        let display = CurrencyService::display_amount(&rates, &money, Currency::Usd);
        assert_eq!(display, Money::new(dec!(100), Currency::Usd));
    }
}
