use std::fmt;
use std::sync::{Mutex, PoisonError};

use colored::Colorize;

// =============================================================================
// Events emitted by producers and consumers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Sent { producer: usize, value: u32 },
    Received { consumer: usize, value: u32 },
}

impl Event {
    pub fn value(&self) -> u32 {
        match *self {
            Event::Sent { value, .. } | Event::Received { value, .. } => value,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Sent { producer, value } => write!(f, "Producer {producer} sent {value}"),
            Event::Received { consumer, value } => {
                write!(f, "Consumer {consumer} received {value}")
            }
        }
    }
}

/// Where tasks report what they did. Implementations must tolerate calls from
/// many tasks at once.
pub trait EventSink: Send + Sync {
    fn record(&self, event: Event);
}

// =============================================================================
// Console output
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn render(&self, event: &Event) -> String {
        let line = event.to_string();
        if !self.color {
            return line;
        }
        match event {
            Event::Sent { .. } => line.as_str().green().to_string(),
            Event::Received { .. } => line.as_str().cyan().to_string(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EventSink for ConsoleSink {
    fn record(&self, event: Event) {
        println!("{}", self.render(&event));
    }
}

// =============================================================================
// In-memory recording
// =============================================================================

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Sent { .. }))
            .map(|e| e.value())
            .collect()
    }

    pub fn received(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Received { .. }))
            .map(|e| e.value())
            .collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
