// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::interrupt::{InterruptLine, WakeLine};
use super::trace::{TraceEvent, TraceRecorder};
use crate::hal::{Platform, PowerManager, TimeProvider};

/// Monotonic clock. In non-realtime mode delays advance a virtual offset
/// instead of sleeping.
#[derive(Debug)]
pub struct SimClock {
    start: Instant,
    skipped_us: AtomicU64,
    realtime: bool,
}

impl SimClock {
    pub fn new(realtime: bool) -> Self {
        Self {
            start: Instant::now(),
            skipped_us: AtomicU64::new(0),
            realtime,
        }
    }

    pub fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64 + self.skipped_us.load(Ordering::Relaxed)
    }

    pub fn delay_us(&self, us: u32) {
        if self.realtime {
            thread::sleep(Duration::from_micros(u64::from(us)));
        } else {
            self.skipped_us.fetch_add(u64::from(us), Ordering::Relaxed);
        }
    }
}

/// Simulated core: clock, WFI, wake-line sleep and halt
pub struct SimPlatform {
    clock: Arc<SimClock>,
    irq: Arc<InterruptLine>,
    wake: Arc<WakeLine>,
    trace: TraceRecorder,
}

impl SimPlatform {
    pub(crate) fn new(
        clock: Arc<SimClock>,
        irq: Arc<InterruptLine>,
        wake: Arc<WakeLine>,
        trace: TraceRecorder,
    ) -> Self {
        Self {
            clock,
            irq,
            wake,
            trace,
        }
    }
}

impl TimeProvider for SimPlatform {
    fn get_time_us(&self) -> u64 {
        self.clock.now_us()
    }

    fn delay_us(&self, us: u32) {
        self.clock.delay_us(us);
    }
}

impl PowerManager for SimPlatform {
    fn wait_for_interrupt(&self) {
        self.irq.wait();
    }

    fn sleep_until_wake(&self) {
        debug!(target: "nimbus-hal", "[SIM] entering low-power sleep");
        self.wake.wait();
        self.trace.record(TraceEvent::Wake);
        debug!(target: "nimbus-hal", "[SIM] woke on falling edge");
    }
}

impl Platform for SimPlatform {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn cpu_frequency_hz(&self) -> u32 {
        100_000_000
    }

    fn halt(&self) -> ! {
        info!(target: "nimbus-hal", "[SIM] halted");
        loop {
            thread::park();
        }
    }
}
