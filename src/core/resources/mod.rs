pub mod pool;

pub use pool::{Release, ResourcePool, UnitHandle};
