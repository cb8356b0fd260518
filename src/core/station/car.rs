//! Per-car process, written as an explicit state machine.
//!
//! Each call to [`CarProcess::resume`] runs the car until its next suspension
//! point (a timer or a pool grant) and reports what it is waiting for.

use super::stats::StatisticsAggregator;
use super::StationObserver;
use crate::core::errors::SimError;
use crate::core::random::{Sampler, VariateSource};
use crate::core::resources::{ResourcePool, UnitHandle};
use crate::core::types::{CarId, PoolKind, SimTime};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarState {
    Arrived,
    TravelingToPump,
    WaitingForPump,
    Fueling,
    TravelingToTill,
    WaitingForTill,
    Paying,
    TravelingToExit,
    Departed,
}

/// Why a car is being resumed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wake {
    Start,
    Timer,
    Granted(PoolKind, UnitHandle),
}

/// What a car is waiting for after a resume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suspend {
    Timeout(SimTime),
    Awaiting(PoolKind),
    Departed,
}

/// Timing data of one car
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    pub id: u64,
    pub arrived_at: SimTime,
    pub pump: Option<usize>,
    /// Grant time minus arrival time, travel to the pump included
    pub wait_before_pump: SimTime,
    /// Time spent in the pump queue only
    pub pump_queue_wait: SimTime,
    pub fueling_time: SimTime,
    pub till: Option<usize>,
    pub till_queue_wait: SimTime,
    pub payment_time: SimTime,
    pub departed_at: Option<SimTime>,
}

impl CarRecord {
    pub fn elapsed(&self) -> Option<SimTime> {
        self.departed_at.map(|t| t - self.arrived_at)
    }
}

/// Everything a car touches while it runs: the shared stream, both pools,
/// the aggregator and the station's observers.
pub(crate) struct CarEnv<'a> {
    pub now: SimTime,
    pub travel_time: SimTime,
    pub fueling: &'a Sampler,
    pub payment: &'a Sampler,
    pub variates: &'a mut VariateSource,
    pub pumps: &'a mut ResourcePool<CarId>,
    pub tills: &'a mut ResourcePool<CarId>,
    pub stats: &'a mut StatisticsAggregator,
    pub observers: &'a mut [Box<dyn StationObserver>],
    /// Waiters handed a unit by a release during this resume
    pub handoffs: Vec<(CarId, PoolKind, UnitHandle)>,
}

impl<'a> CarEnv<'a> {
    fn pool(&mut self, kind: PoolKind) -> &mut ResourcePool<CarId> {
        match kind {
            PoolKind::Pump => &mut *self.pumps,
            PoolKind::Till => &mut *self.tills,
        }
    }

    fn request(&mut self, kind: PoolKind, car: CarId) -> Option<UnitHandle> {
        let now = self.now;
        let granted = self.pool(kind).request(car, now);
        if granted.is_none() {
            debug!("[t={:.3}] {} queued for {}", now, car, kind);
        }
        granted
    }

    fn notify_grant(&mut self, kind: PoolKind, car: CarId, unit: usize) {
        let in_use = self.pool(kind).in_use();
        debug!("[t={:.3}] {} granted {} {}", self.now, car, kind, unit);
        for observer in self.observers.iter_mut() {
            observer.on_grant(self.now, kind, car, unit, in_use);
        }
    }

    fn release(&mut self, kind: PoolKind, car: CarId, handle: UnitHandle) {
        let now = self.now;
        let release = self.pool(kind).release(handle, now);
        self.stats.record_release(kind, release.unit, release.held_for);
        let in_use = self.pool(kind).in_use();
        debug!(
            "[t={:.3}] {} released {} {} after {:.3}",
            now, car, kind, release.unit, release.held_for
        );
        for observer in self.observers.iter_mut() {
            observer.on_release(now, kind, car, release.unit, in_use);
        }
        if let Some((next, handle)) = release.handoff {
            self.handoffs.push((next, kind, handle));
        }
    }
}

#[derive(Debug, Clone)]
pub struct CarProcess {
    id: CarId,
    state: CarState,
    record: CarRecord,
    requested_at: SimTime,
    held: Option<UnitHandle>,
}

impl CarProcess {
    pub fn new(id: CarId) -> Self {
        Self {
            id,
            state: CarState::Arrived,
            record: CarRecord {
                id: id.value(),
                ..CarRecord::default()
            },
            requested_at: 0.0,
            held: None,
        }
    }

    pub fn into_record(self) -> CarRecord {
        self.record
    }

    pub(crate) fn resume(&mut self, wake: Wake, env: &mut CarEnv<'_>) -> Result<Suspend, SimError> {
        match (self.state, wake) {
            (CarState::Arrived, Wake::Start) => {
                self.record.arrived_at = env.now;
                self.state = CarState::TravelingToPump;
                Ok(Suspend::Timeout(env.travel_time))
            }
            (CarState::TravelingToPump, Wake::Timer) => {
                self.state = CarState::WaitingForPump;
                self.requested_at = env.now;
                match env.request(PoolKind::Pump, self.id) {
                    Some(handle) => Ok(self.start_fueling(handle, env)),
                    None => Ok(Suspend::Awaiting(PoolKind::Pump)),
                }
            }
            (CarState::WaitingForPump, Wake::Granted(PoolKind::Pump, handle)) => {
                Ok(self.start_fueling(handle, env))
            }
            (CarState::Fueling, Wake::Timer) => {
                let handle = self.take_held()?;
                env.release(PoolKind::Pump, self.id, handle);
                self.state = CarState::TravelingToTill;
                Ok(Suspend::Timeout(env.travel_time))
            }
            (CarState::TravelingToTill, Wake::Timer) => {
                self.state = CarState::WaitingForTill;
                self.requested_at = env.now;
                match env.request(PoolKind::Till, self.id) {
                    Some(handle) => Ok(self.start_paying(handle, env)),
                    None => Ok(Suspend::Awaiting(PoolKind::Till)),
                }
            }
            (CarState::WaitingForTill, Wake::Granted(PoolKind::Till, handle)) => {
                Ok(self.start_paying(handle, env))
            }
            (CarState::Paying, Wake::Timer) => {
                let handle = self.take_held()?;
                env.release(PoolKind::Till, self.id, handle);
                self.state = CarState::TravelingToExit;
                Ok(Suspend::Timeout(env.travel_time))
            }
            (CarState::TravelingToExit, Wake::Timer) => {
                self.state = CarState::Departed;
                self.record.departed_at = Some(env.now);
                env.stats.record_departure();
                debug!("[t={:.3}] {} departed", env.now, self.id);
                for observer in env.observers.iter_mut() {
                    observer.on_departure(env.now, &self.record);
                }
                Ok(Suspend::Departed)
            }
            (state, _) => Err(SimError::InvalidTransition {
                car: self.id,
                state: format!("{:?}", state),
            }),
        }
    }

    fn start_fueling(&mut self, handle: UnitHandle, env: &mut CarEnv<'_>) -> Suspend {
        let unit = handle.unit();
        self.record.pump = Some(unit);
        self.record.wait_before_pump = env.now - self.record.arrived_at;
        self.record.pump_queue_wait = env.now - self.requested_at;
        env.stats.record_pump_grant(unit, self.record.wait_before_pump);
        env.notify_grant(PoolKind::Pump, self.id, unit);

        let fueling = env.variates.sample(env.fueling);
        self.record.fueling_time = fueling;
        self.held = Some(handle);
        self.state = CarState::Fueling;
        Suspend::Timeout(fueling)
    }

    fn start_paying(&mut self, handle: UnitHandle, env: &mut CarEnv<'_>) -> Suspend {
        let unit = handle.unit();
        self.record.till = Some(unit);
        self.record.till_queue_wait = env.now - self.requested_at;
        env.notify_grant(PoolKind::Till, self.id, unit);

        let payment = env.variates.sample(env.payment);
        self.record.payment_time = payment;
        self.held = Some(handle);
        self.state = CarState::Paying;
        Suspend::Timeout(payment)
    }

    fn take_held(&mut self) -> Result<UnitHandle, SimError> {
        self.held.take().ok_or_else(|| SimError::InvalidTransition {
            car: self.id,
            state: format!("{:?} without a held unit", self.state),
        })
    }
}
