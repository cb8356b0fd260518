//! Independent replications of one station configuration over several seeds.

use super::config::{ConcurrencyMode, SimulationConfig};
use crate::core::errors::SimError;
use crate::core::station::config::StationConfig;
use crate::core::station::simulate;
use crate::core::station::stats::RunSummary;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Run `config` once per seed. Summaries come back in seed order and do not
/// depend on the concurrency mode.
pub fn run_replications(
    config: &StationConfig,
    seeds: &[u64],
    exec: &SimulationConfig,
) -> Result<Vec<RunSummary>, SimError> {
    config.validate()?;
    exec.validate()?;
    info!(
        "Running {} replications ({:?})",
        seeds.len(),
        exec.concurrency_mode
    );

    let run_one = |seed: &u64| simulate(&config.clone().with_random_seed(*seed));

    match exec.concurrency_mode {
        ConcurrencyMode::Sequential => seeds.iter().map(run_one).collect(),
        ConcurrencyMode::Rayon => {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(size) = exec.thread_pool_size {
                builder = builder.num_threads(size);
            }
            let pool = builder
                .build()
                .map_err(|e| SimError::Execution(format!("failed to build thread pool: {}", e)))?;
            pool.install(|| seeds.par_iter().map(run_one).collect())
        }
    }
}

/// Across-run means of a set of replications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSummary {
    pub runs: usize,
    pub mean_completed: f64,
    pub mean_pump_utilization: Vec<f64>,
    pub mean_till_utilization: f64,
    /// Mean of per-run average waits, over runs that have any wait sample
    pub mean_average_wait: f64,
}

impl ReplicationSummary {
    pub fn from_runs(runs: &[RunSummary]) -> Result<Self, SimError> {
        if runs.is_empty() {
            return Err(SimError::EmptySample("no replications to summarize".to_string()));
        }
        let n = runs.len() as f64;
        let pumps = runs[0].per_pump_utilization.len();
        if let Some(odd) = runs.iter().find(|r| r.per_pump_utilization.len() != pumps) {
            return Err(SimError::config(format!(
                "replications disagree on pump count: {} vs {}",
                pumps,
                odd.per_pump_utilization.len()
            )));
        }

        let mean_pump_utilization = (0..pumps)
            .map(|i| runs.iter().map(|r| r.per_pump_utilization[i]).sum::<f64>() / n)
            .collect();

        let waits: Vec<f64> = runs.iter().filter_map(|r| r.average_wait).collect();
        if waits.is_empty() {
            return Err(SimError::EmptySample(
                "no replication recorded a pump wait".to_string(),
            ));
        }

        Ok(Self {
            runs: runs.len(),
            mean_completed: runs.iter().map(|r| r.total_completed as f64).sum::<f64>() / n,
            mean_pump_utilization,
            mean_till_utilization: runs.iter().map(|r| r.till_utilization).sum::<f64>() / n,
            mean_average_wait: waits.iter().sum::<f64>() / waits.len() as f64,
        })
    }
}
