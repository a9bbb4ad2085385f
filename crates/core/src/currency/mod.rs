//! Multi-currency conversion for cached display amounts.

pub mod rates;
pub mod service;

pub use rates::{FixedRates, RateProvider};
pub use service::CurrencyService;
