use crate::core::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent<E> {
    pub due_time: SimTime,
    pub sequence_num: u64,
    pub event: E,
}

impl<E> PartialEq for ScheduledEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for ScheduledEvent<E> {}

impl<E> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .due_time
            .total_cmp(&self.due_time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Pending events keyed by absolute due time, ties broken by insertion order
pub struct EventScheduler<E> {
    event_queue: BinaryHeap<ScheduledEvent<E>>,
    sequence_counter: u64,
}

impl<E> EventScheduler<E> {
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule an event at an absolute time, returns its sequence number
    pub fn schedule_event(&mut self, event: E, due_time: SimTime) -> u64 {
        let sequence_num = self.sequence_counter;
        self.event_queue.push(ScheduledEvent {
            due_time,
            sequence_num,
            event,
        });
        self.sequence_counter += 1;
        sequence_num
    }

    /// Remove the earliest event
    pub fn pop_next(&mut self) -> Option<ScheduledEvent<E>> {
        self.event_queue.pop()
    }

    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.due_time)
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}

impl<E> Default for EventScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
