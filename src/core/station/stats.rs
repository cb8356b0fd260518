use crate::core::errors::SimError;
use crate::core::types::{PoolKind, SimTime};
use serde::{Deserialize, Serialize};

/// Busy-time accumulators, wait samples and completion counter for one run
#[derive(Debug, Clone)]
pub struct StatisticsAggregator {
    pump_busy: Vec<SimTime>,
    pump_services: Vec<u64>,
    till_busy: Vec<SimTime>,
    wait_times: Vec<SimTime>,
    completed: u64,
}

impl StatisticsAggregator {
    pub fn new(pump_count: usize, till_count: usize) -> Self {
        Self {
            pump_busy: vec![0.0; pump_count],
            pump_services: vec![0; pump_count],
            till_busy: vec![0.0; till_count],
            wait_times: Vec::new(),
            completed: 0,
        }
    }

    /// A car got its pump: store its wait and count the service
    pub fn record_pump_grant(&mut self, unit: usize, wait: SimTime) {
        self.wait_times.push(wait);
        self.pump_services[unit] += 1;
    }

    /// A hold ended: add its duration to that unit's busy time
    pub fn record_release(&mut self, pool: PoolKind, unit: usize, held_for: SimTime) {
        let busy = match pool {
            PoolKind::Pump => &mut self.pump_busy,
            PoolKind::Till => &mut self.till_busy,
        };
        busy[unit] += held_for;
    }

    pub fn record_departure(&mut self) {
        self.completed += 1;
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn wait_times(&self) -> &[SimTime] {
        &self.wait_times
    }

    pub fn pump_busy(&self) -> &[SimTime] {
        &self.pump_busy
    }

    pub fn till_busy(&self) -> &[SimTime] {
        &self.till_busy
    }

    /// Mean of the recorded waits
    pub fn mean_wait(&self) -> Result<SimTime, SimError> {
        mean(&self.wait_times)
    }

    pub fn summarize(&self, horizon: SimTime, cars_arrived: u64, cars_in_flight: u64) -> RunSummary {
        let per_till_utilization: Vec<f64> = self.till_busy.iter().map(|b| b / horizon).collect();
        let till_utilization =
            self.till_busy.iter().sum::<f64>() / (horizon * self.till_busy.len() as f64);

        RunSummary {
            horizon,
            total_completed: self.completed,
            cars_arrived,
            cars_in_flight,
            per_pump_utilization: self.pump_busy.iter().map(|b| b / horizon).collect(),
            per_pump_services: self.pump_services.clone(),
            till_utilization,
            per_till_utilization,
            wait_times: self.wait_times.clone(),
            average_wait: self.mean_wait().ok(),
        }
    }
}

fn mean(samples: &[f64]) -> Result<f64, SimError> {
    if samples.is_empty() {
        return Err(SimError::EmptySample(
            "no car reached a pump, average wait is undefined".to_string(),
        ));
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Read-only results of one run, handed to reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub horizon: SimTime,
    pub total_completed: u64,
    pub cars_arrived: u64,
    /// Cars still inside the station at the horizon, never counted as served
    pub cars_in_flight: u64,
    pub per_pump_utilization: Vec<f64>,
    pub per_pump_services: Vec<u64>,
    pub till_utilization: f64,
    pub per_till_utilization: Vec<f64>,
    pub wait_times: Vec<SimTime>,
    /// `None` when no car ever reached a pump
    pub average_wait: Option<SimTime>,
}

impl RunSummary {
    /// Average wait before the pump, or `EmptySample` when there is no data
    pub fn average_wait(&self) -> Result<SimTime, SimError> {
        mean(&self.wait_times)
    }
}
