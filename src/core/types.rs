use serde::{Deserialize, Serialize};

/// Simulated time in minutes
pub type SimTime = f64;

/// Identifier of a car process, strictly increasing in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CarId(pub u64);

impl CarId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "car {}", self.0)
    }
}

/// The shared resources a car competes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Pump,
    Till,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::Pump => write!(f, "pump"),
            PoolKind::Till => write!(f, "till"),
        }
    }
}
