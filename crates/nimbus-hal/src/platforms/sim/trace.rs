// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ordered record of everything the simulated devices observed

use std::sync::Arc;

use parking_lot::Mutex;

use super::gpio::SimPin;

/// One observable hardware event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    CameraPower(bool),
    CameraReset,
    CameraSetup,
    CaptureStarted,
    /// First word of a new input written to the accelerator FIFO
    AcceleratorInputBegin,
    AcceleratorStart { words: usize },
    /// Completion interrupt fired
    AcceleratorComplete,
    AcceleratorUnload { completed: bool },
    RadioInit,
    RadioConfigured,
    RadioSent(Vec<u8>),
    Pin { pin: SimPin, high: bool },
    Wake,
    /// Free-form marker pushed by an observer outside the HAL
    Marker(&'static str),
}

/// Shared, append-only event log
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }

    pub fn marker(&self, name: &'static str) {
        self.record(TraceEvent::Marker(name));
    }

    /// Copy of all events so far
    pub fn snapshot(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    /// Only the markers, in order
    pub fn markers(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Marker(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
