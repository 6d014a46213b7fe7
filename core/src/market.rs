//! Monthly investment return models.
//!
//! The engine never draws randomness itself; it asks the injected
//! MarketModel for this month's return rate.

use crate::{config::EconomyConfig, rng::SimRng};

pub trait MarketModel: Send {
    /// Return rate to apply to the investment balance this month.
    fn monthly_return(&mut self) -> f64;
}

/// Uniform draw from [min, max) on a deterministic stream.
pub struct RandomMarket {
    rng: SimRng,
    min: f64,
    max: f64,
}

impl RandomMarket {
    pub fn new(rng: SimRng, config: &EconomyConfig) -> Self {
        Self {
            rng,
            min: config.investment_return_min,
            max: config.investment_return_max,
        }
    }
}

impl MarketModel for RandomMarket {
    fn monthly_return(&mut self) -> f64 {
        self.rng.uniform(self.min, self.max)
    }
}

/// The same rate every month. Used to pin the draw in tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedMarket(pub f64);

impl MarketModel for FixedMarket {
    fn monthly_return(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed sequence of rates, then holds at zero.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMarket {
    rates: std::collections::VecDeque<f64>,
}

impl ScriptedMarket {
    pub fn new(rates: impl IntoIterator<Item = f64>) -> Self {
        Self { rates: rates.into_iter().collect() }
    }
}

impl MarketModel for ScriptedMarket {
    fn monthly_return(&mut self) -> f64 {
        self.rates.pop_front().unwrap_or(0.0)
    }
}
