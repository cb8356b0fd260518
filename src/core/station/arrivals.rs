use super::config::ArrivalPattern;
use crate::core::errors::SimError;
use crate::core::random::{Sampler, VariateSource};
use crate::core::types::{CarId, SimTime};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Schedule {
    Poisson(Sampler),
    Fixed(VecDeque<SimTime>),
}

/// Lazily produces car arrivals: one gap at a time, one car per arrival.
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    schedule: Schedule,
    next_id: u64,
}

impl ArrivalGenerator {
    pub fn new(pattern: &ArrivalPattern) -> Result<Self, SimError> {
        let schedule = match pattern {
            ArrivalPattern::Exponential { rate_per_minute } => {
                Schedule::Poisson(Sampler::exponential(*rate_per_minute)?)
            }
            ArrivalPattern::Scheduled { times } => Schedule::Fixed(times.iter().copied().collect()),
        };

        Ok(Self {
            schedule,
            next_id: 1,
        })
    }

    /// Absolute time of the next arrival after `now`, or `None` when the
    /// pattern is exhausted. Poisson gaps are drawn from the shared stream.
    pub fn next_arrival(&mut self, now: SimTime, variates: &mut VariateSource) -> Option<SimTime> {
        match &mut self.schedule {
            Schedule::Poisson(gap) => Some(now + variates.sample(gap)),
            Schedule::Fixed(times) => times.pop_front().map(|t| t.max(now)),
        }
    }

    /// Hand out the next car identifier
    pub fn spawn(&mut self) -> CarId {
        let id = CarId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Cars spawned so far
    pub fn spawned(&self) -> u64 {
        self.next_id - 1
    }
}
