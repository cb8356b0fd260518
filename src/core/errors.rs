use super::types::{CarId, SimTime};

/// Errors raised while configuring or running a station simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid setup detected before the run starts
    Configuration(String),
    /// A statistic was requested but no qualifying samples exist
    EmptySample(String),
    /// A car process was resumed in a state that cannot accept the wake-up
    InvalidTransition { car: CarId, state: String },
    /// An event was scheduled before the current simulated time
    NonCausal { requested: SimTime, now: SimTime },
    /// Batch execution could not be set up
    Execution(String),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            SimError::EmptySample(msg) => write!(f, "No samples: {}", msg),
            SimError::InvalidTransition { car, state } => {
                write!(f, "Invalid wake-up for {} in state {}", car, state)
            }
            SimError::NonCausal { requested, now } => write!(
                f,
                "Cannot schedule event at t={} before current time t={}",
                requested, now
            ),
            SimError::Execution(msg) => write!(f, "Execution error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}
