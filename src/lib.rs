pub mod core;
pub mod report;

// Re-export commonly used types
pub use crate::core::errors::SimError;
pub use crate::core::execution::{run_replications, ConcurrencyMode, ReplicationSummary, SimulationConfig};
pub use crate::core::station::config::{ArrivalPattern, ServiceTime, StationConfig};
pub use crate::core::station::stats::RunSummary;
pub use crate::core::station::{run_station, simulate, PetrolStation, StationObserver};
pub use crate::core::types::{CarId, PoolKind, SimTime};
