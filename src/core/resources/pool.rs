use crate::core::errors::SimError;
use crate::core::types::SimTime;
use std::collections::{BTreeSet, VecDeque};

/// A held unit of a pool. Returned on grant and given back on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitHandle {
    unit: usize,
    granted_at: SimTime,
}

impl UnitHandle {
    /// Index of the unit, in `0..capacity`
    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn granted_at(&self) -> SimTime {
        self.granted_at
    }
}

/// Outcome of a release
#[derive(Debug, Clone, PartialEq)]
pub struct Release<T> {
    pub unit: usize,
    /// How long the released unit was held
    pub held_for: SimTime,
    /// Head waiter that received the unit at the same instant, if any
    pub handoff: Option<(T, UnitHandle)>,
}

#[derive(Debug, Clone)]
struct Waiter<T> {
    who: T,
    requested_at: SimTime,
}

/// Capacity-limited shared resource with a strict FIFO wait queue.
///
/// Units are granted lowest-index first. A request never overtakes an
/// earlier waiter, even when a unit happens to be free.
#[derive(Debug, Clone)]
pub struct ResourcePool<T> {
    name: String,
    capacity: usize,
    free_units: BTreeSet<usize>,
    waiters: VecDeque<Waiter<T>>,
    total_grants: u64,
}

impl<T> ResourcePool<T> {
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, SimError> {
        let name = name.into();
        if capacity == 0 {
            return Err(SimError::config(format!(
                "resource pool '{}' needs a positive capacity",
                name
            )));
        }

        Ok(Self {
            name,
            capacity,
            free_units: (0..capacity).collect(),
            waiters: VecDeque::new(),
            total_grants: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.capacity - self.free_units.len()
    }

    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }

    /// Ask for a unit. Grants immediately when a unit is free and nobody is
    /// waiting, otherwise queues `who` and returns `None`.
    pub fn request(&mut self, who: T, now: SimTime) -> Option<UnitHandle> {
        if self.waiters.is_empty() {
            if let Some(unit) = self.free_units.pop_first() {
                self.total_grants += 1;
                return Some(UnitHandle {
                    unit,
                    granted_at: now,
                });
            }
        }

        self.waiters.push_back(Waiter {
            who,
            requested_at: now,
        });
        None
    }

    /// Give a unit back. If anyone is waiting, the head of the queue gets the
    /// same unit without any simulated time passing.
    pub fn release(&mut self, handle: UnitHandle, now: SimTime) -> Release<T> {
        debug_assert!(
            !self.free_units.contains(&handle.unit),
            "unit {} of '{}' released twice",
            handle.unit,
            self.name
        );
        let held_for = now - handle.granted_at;

        let handoff = match self.waiters.pop_front() {
            Some(waiter) => {
                self.total_grants += 1;
                debug_assert!(waiter.requested_at <= now);
                Some((
                    waiter.who,
                    UnitHandle {
                        unit: handle.unit,
                        granted_at: now,
                    },
                ))
            }
            None => {
                self.free_units.insert(handle.unit);
                None
            }
        };

        Release {
            unit: handle.unit,
            held_for,
            handoff,
        }
    }
}
