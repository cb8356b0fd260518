//! The petrol station model: cars arrive, fuel at one of several pumps,
//! pay at the till and leave.

pub mod arrivals;
pub mod car;
pub mod config;
pub mod stats;

use crate::core::errors::SimError;
use crate::core::execution::simulation_engine::{ScheduleContext, SimulationEngine, SimulationModel};
use crate::core::random::{Sampler, VariateSource};
use crate::core::resources::{ResourcePool, UnitHandle};
use crate::core::types::{CarId, PoolKind, SimTime};
use arrivals::ArrivalGenerator;
use car::{CarEnv, CarProcess, CarRecord, Suspend, Wake};
use config::StationConfig;
use log::{debug, info};
use stats::{RunSummary, StatisticsAggregator};
use std::collections::HashMap;

/// Hooks into resource and departure transitions of a run
pub trait StationObserver {
    /// A unit was granted; `in_use` counts held units after the grant
    fn on_grant(&mut self, _now: SimTime, _pool: PoolKind, _car: CarId, _unit: usize, _in_use: usize) {}

    /// A unit was released; `in_use` counts held units after any handoff
    fn on_release(&mut self, _now: SimTime, _pool: PoolKind, _car: CarId, _unit: usize, _in_use: usize) {}

    fn on_departure(&mut self, _now: SimTime, _record: &CarRecord) {}
}

/// Wake-ups the station schedules on the event clock
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// The next car enters the station
    Arrival,
    /// A car's timer expired
    Resume(CarId),
    /// A released unit was handed to a waiting car
    Granted {
        car: CarId,
        pool: PoolKind,
        handle: UnitHandle,
    },
}

pub struct PetrolStation {
    horizon: SimTime,
    travel_time: SimTime,
    fueling: Sampler,
    payment: Sampler,
    variates: VariateSource,
    arrivals: ArrivalGenerator,
    pumps: ResourcePool<CarId>,
    tills: ResourcePool<CarId>,
    cars: HashMap<CarId, CarProcess>,
    stats: StatisticsAggregator,
    completed: Vec<CarRecord>,
    observers: Vec<Box<dyn StationObserver>>,
}

impl PetrolStation {
    pub fn new(config: &StationConfig) -> Result<Self, SimError> {
        config.validate()?;

        Ok(Self {
            horizon: config.horizon_minutes,
            travel_time: config.travel_time_minutes,
            fueling: config.fueling_time.sampler()?,
            payment: config.payment_time.sampler()?,
            variates: VariateSource::new(config.random_seed),
            arrivals: ArrivalGenerator::new(&config.arrivals)?,
            pumps: ResourcePool::new("pumps", config.pump_count)?,
            tills: ResourcePool::new("till", config.till_count)?,
            cars: HashMap::new(),
            stats: StatisticsAggregator::new(config.pump_count, config.till_count),
            completed: Vec::new(),
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn StationObserver>) {
        self.observers.push(observer);
    }

    pub fn stats(&self) -> &StatisticsAggregator {
        &self.stats
    }

    pub fn pumps(&self) -> &ResourcePool<CarId> {
        &self.pumps
    }

    pub fn tills(&self) -> &ResourcePool<CarId> {
        &self.tills
    }

    /// Records of cars that left the station, in departure order
    pub fn completed_cars(&self) -> &[CarRecord] {
        &self.completed
    }

    /// Cars still inside the station
    pub fn cars_in_flight(&self) -> usize {
        self.cars.len()
    }

    pub fn summary(&self) -> RunSummary {
        self.stats.summarize(
            self.horizon,
            self.arrivals.spawned(),
            self.cars.len() as u64,
        )
    }

    fn schedule_next_arrival(&mut self, ctx: &mut ScheduleContext<'_, StationEvent>) -> Result<(), SimError> {
        match self.arrivals.next_arrival(ctx.now(), &mut self.variates) {
            Some(at) if at <= self.horizon => ctx.schedule_at(at, StationEvent::Arrival),
            _ => {
                debug!("[t={:.3}] no further arrivals before the horizon", ctx.now());
                Ok(())
            }
        }
    }

    fn drive(
        &mut self,
        id: CarId,
        wake: Wake,
        ctx: &mut ScheduleContext<'_, StationEvent>,
    ) -> Result<(), SimError> {
        let mut car = self.cars.remove(&id).ok_or_else(|| SimError::InvalidTransition {
            car: id,
            state: "unknown car".to_string(),
        })?;

        let mut env = CarEnv {
            now: ctx.now(),
            travel_time: self.travel_time,
            fueling: &self.fueling,
            payment: &self.payment,
            variates: &mut self.variates,
            pumps: &mut self.pumps,
            tills: &mut self.tills,
            stats: &mut self.stats,
            observers: &mut self.observers,
            handoffs: Vec::new(),
        };
        let suspend = car.resume(wake, &mut env)?;
        let handoffs = env.handoffs;

        match suspend {
            Suspend::Timeout(delay) => {
                ctx.schedule_after(delay, StationEvent::Resume(id))?;
                self.cars.insert(id, car);
            }
            Suspend::Awaiting(_) => {
                self.cars.insert(id, car);
            }
            Suspend::Departed => self.completed.push(car.into_record()),
        }

        for (next, pool, handle) in handoffs {
            ctx.schedule_now(StationEvent::Granted {
                car: next,
                pool,
                handle,
            });
        }
        Ok(())
    }
}

impl SimulationModel for PetrolStation {
    type Event = StationEvent;

    fn start(&mut self, ctx: &mut ScheduleContext<'_, StationEvent>) -> Result<(), SimError> {
        self.schedule_next_arrival(ctx)
    }

    fn on_event(
        &mut self,
        event: StationEvent,
        ctx: &mut ScheduleContext<'_, StationEvent>,
    ) -> Result<(), SimError> {
        match event {
            StationEvent::Arrival => {
                let id = self.arrivals.spawn();
                debug!("[t={:.3}] {} arrived", ctx.now(), id);
                self.cars.insert(id, CarProcess::new(id));
                self.drive(id, Wake::Start, ctx)?;
                self.schedule_next_arrival(ctx)
            }
            StationEvent::Resume(id) => self.drive(id, Wake::Timer, ctx),
            StationEvent::Granted { car, pool, handle } => {
                self.drive(car, Wake::Granted(pool, handle), ctx)
            }
        }
    }
}

/// Build a station from `config`, run it to the horizon and return the engine
/// so callers can inspect the final state.
pub fn run_station(
    config: &StationConfig,
    observers: Vec<Box<dyn StationObserver>>,
) -> Result<SimulationEngine<PetrolStation>, SimError> {
    let mut station = PetrolStation::new(config)?;
    for observer in observers {
        station.add_observer(observer);
    }

    let mut engine = SimulationEngine::new(station, config.horizon_minutes)?;
    engine.run()?;

    let station = engine.model();
    info!(
        "Served {} cars, {} still inside at t={}",
        station.stats().completed(),
        station.cars_in_flight(),
        config.horizon_minutes
    );
    Ok(engine)
}

/// Run one simulation and return its summary
pub fn simulate(config: &StationConfig) -> Result<RunSummary, SimError> {
    let engine = run_station(config, Vec::new())?;
    Ok(engine.model().summary())
}
