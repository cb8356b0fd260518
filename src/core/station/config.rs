use crate::core::errors::SimError;
use crate::core::random::Sampler;
use serde::{Deserialize, Serialize};

/// Distribution of a service duration, in minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceTime {
    Triangular { min: f64, mode: f64, max: f64 },
    Fixed { minutes: f64 },
}

impl ServiceTime {
    pub fn triangular(min: f64, mode: f64, max: f64) -> Self {
        ServiceTime::Triangular { min, mode, max }
    }

    pub fn fixed(minutes: f64) -> Self {
        ServiceTime::Fixed { minutes }
    }

    pub fn sampler(&self) -> Result<Sampler, SimError> {
        match *self {
            ServiceTime::Triangular { min, mode, max } => Sampler::triangular(min, mode, max),
            ServiceTime::Fixed { minutes } => Sampler::fixed(minutes),
        }
    }
}

/// How cars enter the station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArrivalPattern {
    /// Poisson arrivals: exponential gaps with the given rate
    Exponential { rate_per_minute: f64 },
    /// Cars arrive at exactly these times (ascending)
    Scheduled { times: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub horizon_minutes: f64,
    pub pump_count: usize,
    pub till_count: usize,
    pub arrivals: ArrivalPattern,
    pub travel_time_minutes: f64,
    pub fueling_time: ServiceTime,
    pub payment_time: ServiceTime,
    pub random_seed: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: 1440.0,
            pump_count: 4,
            till_count: 1,
            arrivals: ArrivalPattern::Exponential {
                rate_per_minute: 500.0 / 1440.0,
            },
            travel_time_minutes: 1.0,
            fueling_time: ServiceTime::triangular(0.5, 1.0, 3.0),
            payment_time: ServiceTime::triangular(0.1667, 0.5, 2.0),
            random_seed: 1,
        }
    }
}

impl StationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizon(mut self, minutes: f64) -> Self {
        self.horizon_minutes = minutes;
        self
    }

    pub fn with_pump_count(mut self, count: usize) -> Self {
        self.pump_count = count;
        self
    }

    pub fn with_till_count(mut self, count: usize) -> Self {
        self.till_count = count;
        self
    }

    pub fn with_arrival_rate(mut self, rate_per_minute: f64) -> Self {
        self.arrivals = ArrivalPattern::Exponential { rate_per_minute };
        self
    }

    pub fn with_scheduled_arrivals(mut self, times: Vec<f64>) -> Self {
        self.arrivals = ArrivalPattern::Scheduled { times };
        self
    }

    pub fn with_travel_time(mut self, minutes: f64) -> Self {
        self.travel_time_minutes = minutes;
        self
    }

    pub fn with_fueling_time(mut self, time: ServiceTime) -> Self {
        self.fueling_time = time;
        self
    }

    pub fn with_payment_time(mut self, time: ServiceTime) -> Self {
        self.payment_time = time;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: StationConfig = serde_json::from_str(text)
            .map_err(|e| SimError::config(format!("invalid station config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !self.horizon_minutes.is_finite() || self.horizon_minutes <= 0.0 {
            return Err(SimError::config("Horizon must be greater than 0"));
        }

        if self.pump_count == 0 {
            return Err(SimError::config("Pump count must be greater than 0"));
        }

        if self.till_count == 0 {
            return Err(SimError::config("Till count must be greater than 0"));
        }

        if !self.travel_time_minutes.is_finite() || self.travel_time_minutes < 0.0 {
            return Err(SimError::config("Travel time must be non-negative"));
        }

        match &self.arrivals {
            ArrivalPattern::Exponential { rate_per_minute } => {
                Sampler::exponential(*rate_per_minute)?;
            }
            ArrivalPattern::Scheduled { times } => {
                if times.iter().any(|t| !t.is_finite() || *t < 0.0) {
                    return Err(SimError::config(
                        "Scheduled arrival times must be finite and non-negative",
                    ));
                }
                if times.windows(2).any(|pair| pair[1] < pair[0]) {
                    return Err(SimError::config(
                        "Scheduled arrival times must be in ascending order",
                    ));
                }
            }
        }

        self.fueling_time.sampler()?;
        self.payment_time.sampler()?;

        Ok(())
    }
}
