//! Event queue with deterministic ordering.

use sirsim_types::{EventKind, NodeIndex};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use thiserror::Error;

/// Errors raised by the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventQueueError {
    /// `pop_min` was called with no pending events.
    #[error("event queue is empty")]
    Empty,
}

/// A pending state transition.
///
/// Events are ordered by:
/// 1. Time (earlier first)
/// 2. Kind (`Transmit` before `Recover`)
/// 3. Sequence number (creation order)
///
/// Events are never removed once pushed. A consumer decides whether a popped
/// event is still current by comparing its time against its own per-node
/// authoritative value.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// Simulation time at which the event fires.
    pub time: f64,
    /// Node the event applies to.
    pub node: NodeIndex,
    /// What happens to the node.
    pub kind: EventKind,
    /// Creation counter, used only to break ties.
    pub sequence: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Order by time first
        match self.time.total_cmp(&other.time) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // Then by kind (Transmit < Recover)
        match self.kind.cmp(&other.kind) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // Finally by sequence (FIFO)
        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Min-priority queue of pending events.
///
/// Owns the sequence counter, so every event created through
/// [`EventQueue::schedule`] gets a unique, monotonically increasing sequence.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with room for `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    /// Create an event with the next sequence number and push it.
    pub fn schedule(&mut self, time: f64, node: NodeIndex, kind: EventKind) -> Event {
        let event = Event {
            time,
            node,
            kind,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.push(event);
        event
    }

    /// Push an already-built event. O(log k).
    pub fn push(&mut self, event: Event) {
        self.next_sequence = self.next_sequence.max(event.sequence + 1);
        self.heap.push(Reverse(event));
    }

    /// Remove and return the minimum event. O(log k).
    pub fn pop_min(&mut self) -> Result<Event, EventQueueError> {
        self.heap
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(EventQueueError::Empty)
    }

    /// The minimum event, without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    /// Number of pending events, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Sequence number the next scheduled event will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}
