pub mod errors;
pub mod execution;
pub mod random;
pub mod resources;
pub mod station;
pub mod types;

#[cfg(test)]
mod tests;
