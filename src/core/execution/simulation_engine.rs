use super::event_scheduler::EventScheduler;
use crate::core::errors::SimError;
use crate::core::types::SimTime;
use log::{debug, info};

/// A set of logical processes driven by the engine.
///
/// The engine owns the clock and the event heap; the model owns all process
/// state and reacts to one event at a time, scheduling follow-ups through
/// the context.
pub trait SimulationModel {
    type Event;

    /// Called once before the first event is processed
    fn start(&mut self, ctx: &mut ScheduleContext<'_, Self::Event>) -> Result<(), SimError>;

    /// Resume whatever was waiting on `event`
    fn on_event(
        &mut self,
        event: Self::Event,
        ctx: &mut ScheduleContext<'_, Self::Event>,
    ) -> Result<(), SimError>;
}

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when the simulated clock moves forward
    fn on_clock_advance(&mut self, _old_time: SimTime, _new_time: SimTime) {}

    /// Called after each processed event
    fn on_step_complete(&mut self, _time: SimTime, _pending_events: usize) {}
}

/// Scheduling handle given to the model while it handles an event
pub struct ScheduleContext<'a, E> {
    now: SimTime,
    scheduler: &'a mut EventScheduler<E>,
}

impl<'a, E> ScheduleContext<'a, E> {
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Resume after `delay` minutes
    pub fn schedule_after(&mut self, delay: SimTime, event: E) -> Result<(), SimError> {
        self.schedule_at(self.now + delay, event)
    }

    /// Resume within the current instant, after everything already due now
    pub fn schedule_now(&mut self, event: E) {
        self.scheduler.schedule_event(event, self.now);
    }

    pub fn schedule_at(&mut self, at: SimTime, event: E) -> Result<(), SimError> {
        if at.is_nan() || at < self.now {
            return Err(SimError::NonCausal {
                requested: at,
                now: self.now,
            });
        }
        self.scheduler.schedule_event(event, at);
        Ok(())
    }
}

/// Event clock: pops the earliest event, advances time, resumes the model,
/// and stops once the next event lies beyond the horizon. Anything still
/// pending at that point is abandoned.
pub struct SimulationEngine<M: SimulationModel> {
    model: M,
    scheduler: EventScheduler<M::Event>,
    current_time: SimTime,
    horizon: SimTime,
    started: bool,
    halted: bool,
    events_processed: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<M: SimulationModel> SimulationEngine<M> {
    pub fn new(model: M, horizon: SimTime) -> Result<Self, SimError> {
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(SimError::config(format!(
                "horizon must be positive, got {}",
                horizon
            )));
        }

        Ok(Self {
            model,
            scheduler: EventScheduler::new(),
            current_time: 0.0,
            horizon,
            started: false,
            halted: false,
            events_processed: 0,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Run to the horizon, returns the time of the last processed event
    pub fn run(&mut self) -> Result<SimTime, SimError> {
        info!("Running simulation until t={}", self.horizon);
        while self.step()? {}
        info!(
            "Simulation halted at t={:.3} after {} events ({} abandoned)",
            self.current_time,
            self.events_processed,
            self.scheduler.len()
        );
        Ok(self.current_time)
    }

    /// Process one event, returns false once the run is over
    pub fn step(&mut self) -> Result<bool, SimError> {
        if self.halted {
            return Ok(false);
        }

        if !self.started {
            self.started = true;
            let mut ctx = ScheduleContext {
                now: self.current_time,
                scheduler: &mut self.scheduler,
            };
            self.model.start(&mut ctx)?;
        }

        let due = match self.scheduler.peek_next_time() {
            Some(due) if due <= self.horizon => due,
            _ => {
                self.halted = true;
                return Ok(false);
            }
        };

        let scheduled = match self.scheduler.pop_next() {
            Some(scheduled) => scheduled,
            None => return Ok(false),
        };
        debug_assert_eq!(scheduled.due_time, due);

        if due > self.current_time {
            let old_time = self.current_time;
            self.current_time = due;
            for observer in &mut self.observers {
                observer.on_clock_advance(old_time, due);
            }
            debug!("--- t={:.4} ---", due);
        }

        let mut ctx = ScheduleContext {
            now: self.current_time,
            scheduler: &mut self.scheduler,
        };
        self.model.on_event(scheduled.event, &mut ctx)?;
        self.events_processed += 1;

        let pending = self.scheduler.len();
        for observer in &mut self.observers {
            observer.on_step_complete(self.current_time, pending);
        }

        Ok(true)
    }

    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}
