use std::collections::VecDeque;

use crate::frame::Frame;

/// Default number of events kept before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// A frame-stamped record of something notable (mode changes, load results).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame_index: u64,
    pub time_ms: f64,
    pub kind: &'static str,
    pub message: String,
}

/// Bounded event log.
///
/// The animation loop never terminates, so the log keeps only the most
/// recent `capacity` events.
#[derive(Debug)]
pub struct EventBus {
    capacity: usize,
    events: VecDeque<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: VecDeque::new(),
        }
    }

    pub fn emit(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(Event {
            frame_index: frame.index,
            time_ms: frame.time_ms,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
