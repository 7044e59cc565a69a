//! Discrete-event layer: pending state transitions in time order
//!
//! The queue is a min-heap keyed by `(time, seq)` where `seq` is an insertion
//! counter, so events sharing a timestamp drain in the order they were
//! scheduled. The simulation loop relies on that stability.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::types::{Pid, State};

/// A pending state transition for one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: u64,
    pub pid: Pid,
    pub from: State,
    pub to: State,
}

impl Event {
    pub fn new(time: u64, pid: Pid, from: State, to: State) -> Self {
        Event { time, pid, from, to }
    }
}

/// Heap entry wrapper; ordering is reversed so the `BinaryHeap` acts as a
/// min-heap on `(time, seq)`.
#[derive(Debug, Clone, Copy)]
struct QueuedEvent {
    event: Event,
    seq: u64,
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.event.time, other.seq).cmp(&(self.event.time, self.seq))
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueuedEvent {}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event.time == other.event.time && self.seq == other.seq
    }
}

/// Time-ordered queue of pending events with stable insertion.
///
/// The simulation loop maintains the invariant that at most one event is
/// pending per live process.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        trace!(
            "queue event t={} pid={} {:?} -> {:?}",
            event.time, event.pid, event.from, event.to
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedEvent { event, seq });
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|q| q.event)
    }

    /// Timestamp of the next pending event, if any.
    pub fn next_time(&self) -> Option<u64> {
        self.heap.peek().map(|q| q.event.time)
    }

    /// Drop the pending event of `pid`. Called only on the preemption path,
    /// where exactly one such event exists.
    pub fn remove_for(&mut self, pid: Pid) {
        let before = self.heap.len();
        self.heap.retain(|q| q.event.pid != pid);
        debug_assert_eq!(
            before - self.heap.len(),
            1,
            "process {pid} must have exactly one pending event"
        );
        trace!("cancelled pending event for pid={}", pid);
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
