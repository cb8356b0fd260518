//! Seeded random variate source shared by every process of a run.
//!
//! All draws go through one `StdRng`, so the order in which the arrival
//! generator and the car processes consume samples is fixed by the event
//! order. Re-running with the same seed replays the same trace.

use super::errors::SimError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Triangular};

/// Single globally-ordered random stream
#[derive(Debug, Clone)]
pub struct VariateSource {
    rng: StdRng,
    draws: u64,
}

impl VariateSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Number of random samples consumed so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draw one value from `sampler`
    pub fn sample(&mut self, sampler: &Sampler) -> f64 {
        match sampler {
            Sampler::Fixed(value) => *value,
            Sampler::Triangular(dist) => {
                self.draws += 1;
                dist.sample(&mut self.rng)
            }
            Sampler::Exponential(dist) => {
                self.draws += 1;
                dist.sample(&mut self.rng)
            }
        }
    }
}

/// A prepared distribution. Fixed values never touch the stream.
#[derive(Debug, Clone, Copy)]
pub enum Sampler {
    Fixed(f64),
    Triangular(Triangular<f64>),
    Exponential(Exp<f64>),
}

impl Sampler {
    pub fn fixed(value: f64) -> Result<Self, SimError> {
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::config(format!(
                "fixed duration must be finite and non-negative, got {}",
                value
            )));
        }
        Ok(Sampler::Fixed(value))
    }

    /// Triangular distribution over `[min, max]` peaking at `mode`
    pub fn triangular(min: f64, mode: f64, max: f64) -> Result<Self, SimError> {
        if !(min.is_finite() && mode.is_finite() && max.is_finite()) {
            return Err(SimError::config("triangular bounds must be finite"));
        }
        if min < 0.0 {
            return Err(SimError::config(format!(
                "triangular minimum must be non-negative, got {}",
                min
            )));
        }
        if !(min <= mode && mode <= max) {
            return Err(SimError::config(format!(
                "triangular bounds violate min <= mode <= max: ({}, {}, {})",
                min, mode, max
            )));
        }
        if min == max {
            return Ok(Sampler::Fixed(min));
        }
        Triangular::new(min, max, mode)
            .map(Sampler::Triangular)
            .map_err(|e| SimError::config(format!("triangular distribution: {}", e)))
    }

    /// Exponential gaps with the given rate (events per minute)
    pub fn exponential(rate: f64) -> Result<Self, SimError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SimError::config(format!(
                "exponential rate must be positive, got {}",
                rate
            )));
        }
        Exp::new(rate)
            .map(Sampler::Exponential)
            .map_err(|e| SimError::config(format!("exponential distribution: {}", e)))
    }
}
