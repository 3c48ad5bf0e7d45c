// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Interrupt and wake lines built on a mutex and condition variable

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Level-latched CPU interrupt line.
///
/// `raise` sets a pending bit; `wait` sleeps until it is set and clears it.
/// A raise that lands before the wait is therefore not lost.
#[derive(Debug, Default)]
pub struct InterruptLine {
    pending: Mutex<bool>,
    cv: Condvar,
}

impl InterruptLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        let mut pending = self.pending.lock();
        *pending = true;
        self.cv.notify_all();
    }

    pub fn wait(&self) {
        let mut pending = self.pending.lock();
        while !*pending {
            self.cv.wait(&mut pending);
        }
        *pending = false;
    }
}

/// Falling-edge counter for the wake pin
#[derive(Debug, Default)]
pub struct WakeLine {
    edges: Mutex<u32>,
    cv: Condvar,
}

impl WakeLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn falling_edge(&self) {
        let mut edges = self.edges.lock();
        *edges = edges.saturating_add(1);
        self.cv.notify_all();
    }

    /// Block until an edge is pending, then consume it
    pub fn wait(&self) {
        let mut edges = self.edges.lock();
        while *edges == 0 {
            self.cv.wait(&mut edges);
        }
        *edges -= 1;
    }

    pub fn pending(&self) -> u32 {
        *self.edges.lock()
    }
}

/// Test and tool handle for producing wake edges
#[derive(Debug, Clone)]
pub struct WakeTrigger {
    line: Arc<WakeLine>,
}

impl WakeTrigger {
    pub(crate) fn new(line: Arc<WakeLine>) -> Self {
        Self { line }
    }

    pub fn fire(&self) {
        self.line.falling_edge();
    }

    pub fn fire_n(&self, n: u32) {
        for _ in 0..n {
            self.line.falling_edge();
        }
    }

    /// Fire an edge every `interval` from a background thread, like a
    /// real-time clock alarm wired to the wake pin
    pub fn start_periodic(&self, interval: Duration) -> thread::JoinHandle<()> {
        let line = Arc::clone(&self.line);
        thread::spawn(move || loop {
            thread::sleep(interval);
            line.falling_edge();
        })
    }
}
