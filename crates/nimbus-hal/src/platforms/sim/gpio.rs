// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::Mutex;

use super::trace::{TraceEvent, TraceRecorder};
use super::SimError;
use crate::hal::GpioProvider;

/// Output lines on the simulated board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimPin {
    RadioReset = 0,
    FaultLed = 1,
}

const PIN_COUNT: usize = 2;

pub(crate) type PinLevels = Arc<Mutex<[bool; PIN_COUNT]>>;

/// GPIO bank; every level change is traced
pub struct SimGpio {
    levels: PinLevels,
    trace: TraceRecorder,
}

impl SimGpio {
    pub(crate) fn new(levels: PinLevels, trace: TraceRecorder) -> Self {
        Self { levels, trace }
    }

    fn drive(&mut self, pin: SimPin, high: bool) {
        let mut levels = self.levels.lock();
        if levels[pin as usize] != high {
            levels[pin as usize] = high;
            self.trace.record(TraceEvent::Pin { pin, high });
        }
    }
}

impl GpioProvider for SimGpio {
    type Pin = SimPin;
    type Error = SimError;

    fn set_high(&mut self, pin: SimPin) -> Result<(), SimError> {
        self.drive(pin, true);
        Ok(())
    }

    fn set_low(&mut self, pin: SimPin) -> Result<(), SimError> {
        self.drive(pin, false);
        Ok(())
    }

    fn is_high(&self, pin: SimPin) -> Result<bool, SimError> {
        Ok(self.levels.lock()[pin as usize])
    }
}

/// Read-only view of pin levels for tests
#[derive(Debug, Clone)]
pub struct PinMonitor {
    levels: PinLevels,
}

impl PinMonitor {
    pub(crate) fn new(levels: PinLevels) -> Self {
        Self { levels }
    }

    pub fn is_high(&self, pin: SimPin) -> bool {
        self.levels.lock()[pin as usize]
    }
}
