// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use nimbus_neural::Frame;
use tracing::{debug, warn};

use super::clock::SimClock;
use super::trace::{TraceEvent, TraceRecorder};
use super::SimError;
use crate::hal::{CameraSensor, CaptureConfig, TransferMode};

/// Fault injection and timing for the simulated sensor
#[derive(Debug, Clone, Default)]
pub struct CameraBehavior {
    /// Microseconds from `start_capture` until the frame is ready
    pub capture_latency_us: u64,
    /// Reject every `setup` call
    pub fail_setup: bool,
    /// Report a streaming overflow on this capture (1-based)
    pub overflow_on_capture: Option<u32>,
}

/// Image sensor fed from pre-loaded RGB888 frames.
///
/// With no frames loaded it produces solid gray frames whose level changes
/// every capture.
pub struct SimCamera {
    clock: Arc<SimClock>,
    trace: TraceRecorder,
    behavior: CameraBehavior,
    frames: Vec<Vec<u8>>,
    clock_hz: Option<u32>,
    config: Option<CaptureConfig>,
    registers: HashMap<u8, u8>,
    powered: bool,
    buffer: Vec<u8>,
    captures: u32,
    capture_started_us: Option<u64>,
    overflows: u32,
}

impl SimCamera {
    pub(crate) fn new(
        clock: Arc<SimClock>,
        trace: TraceRecorder,
        behavior: CameraBehavior,
        frames: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            clock,
            trace,
            behavior,
            frames,
            clock_hz: None,
            config: None,
            registers: HashMap::new(),
            powered: false,
            buffer: Vec::new(),
            captures: 0,
            capture_started_us: None,
            overflows: 0,
        }
    }

    pub fn register(&self, address: u8) -> Option<u8> {
        self.registers.get(&address).copied()
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Fill the capture buffer with the next RGB888 source frame
    fn fill(&mut self, config: CaptureConfig) {
        let pixels = config.width as usize * config.height as usize;
        let stride = usize::from(config.bytes_per_pixel());
        self.buffer.resize(config.frame_len(), 0);

        let synthetic;
        let source: &[u8] = if self.frames.is_empty() {
            let level = (self.captures.wrapping_mul(53) % 256) as u8;
            synthetic = vec![level; pixels * 3];
            &synthetic
        } else {
            &self.frames[(self.captures as usize - 1) % self.frames.len()]
        };

        for (i, out) in self.buffer.chunks_exact_mut(stride).enumerate() {
            let rgb = source.get(i * 3..i * 3 + 3).unwrap_or(&[0, 0, 0]);
            out[..3].copy_from_slice(rgb);
            if stride == 4 {
                out[3] = 0;
            }
        }
    }
}

impl CameraSensor for SimCamera {
    type Error = SimError;

    fn init(&mut self, clock_hz: u32) -> Result<(), SimError> {
        if !self.powered {
            return Err(SimError::PoweredDown("camera"));
        }
        self.clock_hz = Some(clock_hz);
        debug!(target: "nimbus-hal", "[SIM] camera init at {} Hz", clock_hz);
        Ok(())
    }

    fn setup(&mut self, config: &CaptureConfig) -> Result<(), SimError> {
        if self.clock_hz.is_none() {
            return Err(SimError::NotInitialized("camera"));
        }
        if self.behavior.fail_setup {
            return Err(SimError::SetupRejected {
                device: "camera",
                reason: "sensor did not acknowledge configuration".to_string(),
            });
        }
        if config.width == 0 || config.height == 0 {
            return Err(SimError::SetupRejected {
                device: "camera",
                reason: format!("invalid resolution {}x{}", config.width, config.height),
            });
        }
        self.config = Some(*config);
        self.buffer = vec![0; config.frame_len()];
        self.trace.record(TraceEvent::CameraSetup);
        debug!(
            target: "nimbus-hal",
            "[SIM] camera setup {}x{} via {} (channel {})",
            config.width, config.height, config.transfer_mode, config.dma_channel
        );
        Ok(())
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), SimError> {
        if self.clock_hz.is_none() {
            return Err(SimError::NotInitialized("camera"));
        }
        self.registers.insert(address, value);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SimError> {
        if !self.powered {
            return Err(SimError::PoweredDown("camera"));
        }
        self.clock_hz = None;
        self.config = None;
        self.registers.clear();
        self.capture_started_us = None;
        self.trace.record(TraceEvent::CameraReset);
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), SimError> {
        if self.powered != on {
            self.powered = on;
            self.trace.record(TraceEvent::CameraPower(on));
        }
        Ok(())
    }

    fn start_capture(&mut self) {
        let Some(config) = self.config.filter(|_| self.powered) else {
            warn!(target: "nimbus-hal", "[SIM] start_capture on an unconfigured or unpowered camera");
            return;
        };
        self.captures += 1;
        self.overflows = 0;
        self.fill(config);
        if config.transfer_mode == TransferMode::Streaming
            && self.behavior.overflow_on_capture == Some(self.captures)
        {
            self.overflows = 1;
        }
        self.capture_started_us = Some(self.clock.now_us());
        self.trace.record(TraceEvent::CaptureStarted);
    }

    fn is_ready(&self) -> bool {
        self.capture_started_us
            .is_some_and(|t| self.clock.now_us() >= t + self.behavior.capture_latency_us)
    }

    fn image(&self) -> Frame<'_> {
        match &self.config {
            Some(c) => Frame::new(&self.buffer, c.width, c.height, c.bytes_per_pixel()),
            None => Frame::new(&[], 0, 0, 3),
        }
    }

    fn overflow_count(&self) -> u32 {
        self.overflows
    }
}
