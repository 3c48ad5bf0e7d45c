// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Image sensor wrapper
//!
//! A frame can only be read with a [`FrameReady`] token, which only
//! [`FrameSource::poll`] hands out once the capture has finished. The
//! borrowed [`Frame`] keeps the source immutably borrowed, so a new capture
//! cannot start while it is in use.

use nimbus_hal::{CameraSensor, CaptureConfig, TimeProvider, TransferMode};
use nimbus_neural::Frame;
use tracing::{debug, trace};

use crate::error::{NodeError, Result};
use crate::settings::SensorSettings;

/// Sensor register holding the pixel clock prescaler
pub const CLOCK_PRESCALER_REGISTER: u8 = 0x11;

/// Interval between readiness polls
const READY_POLL_INTERVAL_US: u32 = 100;

/// Proof that capture number `sequence` has completed
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ready frame should be read"]
pub struct FrameReady {
    sequence: u32,
}

impl FrameReady {
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// Image sensor with its capture settings
pub struct FrameSource<C: CameraSensor> {
    camera: C,
    settings: SensorSettings,
    sequence: u32,
}

impl<C: CameraSensor> FrameSource<C> {
    pub fn new(camera: C, settings: SensorSettings) -> Self {
        Self {
            camera,
            settings,
            sequence: 0,
        }
    }

    pub fn capture_config(&self) -> &CaptureConfig {
        &self.settings.capture
    }

    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    /// Number of captures started so far
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn power_on(&mut self) -> Result<()> {
        self.camera.set_power(true).map_err(NodeError::sensor_power)
    }

    pub fn power_off(&mut self) -> Result<()> {
        self.camera.set_power(false).map_err(NodeError::sensor_power)
    }

    /// Reset, initialise and set up the sensor.
    ///
    /// Used at boot and on every wake. A failure here is fatal.
    pub fn configure(&mut self) -> Result<()> {
        self.camera.reset().map_err(NodeError::sensor_setup)?;
        self.camera
            .init(self.settings.clock_hz)
            .map_err(NodeError::sensor_setup)?;
        self.camera
            .setup(&self.settings.capture)
            .map_err(NodeError::sensor_setup)?;
        if let Some(prescaler) = self.settings.clock_prescaler {
            self.camera
                .write_register(CLOCK_PRESCALER_REGISTER, prescaler)
                .map_err(NodeError::sensor_setup)?;
        }
        debug!(
            target: "nimbus-node",
            "sensor configured: {}x{} via {}",
            self.settings.capture.width,
            self.settings.capture.height,
            self.settings.capture.transfer_mode
        );
        Ok(())
    }

    /// Begin the next capture. Returns immediately.
    pub fn start_capture(&mut self) {
        self.sequence = self.sequence.wrapping_add(1);
        self.camera.start_capture();
        trace!(target: "nimbus-node", "capture {} started", self.sequence);
    }

    /// Side-effect free readiness check
    pub fn is_frame_ready(&self) -> bool {
        self.camera.is_ready()
    }

    /// Token for the current capture, if it has finished
    pub fn poll(&self) -> Option<FrameReady> {
        self.camera.is_ready().then_some(FrameReady {
            sequence: self.sequence,
        })
    }

    /// Poll until the current capture finishes
    pub fn wait_ready<T: TimeProvider>(&self, time: &T) -> FrameReady {
        loop {
            if let Some(ready) = self.poll() {
                return ready;
            }
            time.delay_us(READY_POLL_INTERVAL_US);
        }
    }

    /// Fail if the streaming path dropped data during the last capture
    pub fn check_overflow(&self) -> Result<()> {
        if self.settings.capture.transfer_mode != TransferMode::Streaming {
            return Ok(());
        }
        match self.camera.overflow_count() {
            0 => Ok(()),
            count => Err(NodeError::StreamingOverflow { count }),
        }
    }

    /// Borrow the finished frame
    pub fn read_frame(&self, ready: FrameReady) -> Frame<'_> {
        debug_assert_eq!(ready.sequence, self.sequence, "stale FrameReady token");
        self.camera.image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_hal::sim::{CameraBehavior, SimBoard, SimConfig, TraceEvent};
    use nimbus_hal::PixelFormat;

    fn settings(mode: TransferMode, prescaler: Option<u8>) -> SensorSettings {
        SensorSettings {
            clock_hz: 10_000_000,
            capture: CaptureConfig {
                width: 4,
                height: 4,
                pixel_format: PixelFormat::Rgb888,
                transfer_mode: mode,
                dma_channel: 0,
            },
            clock_prescaler: prescaler,
            power_up_delay_ms: 0,
        }
    }

    #[test]
    fn test_ready_token_only_after_capture_completes() {
        let (p, handles) = SimBoard::build(SimConfig::default());
        let mut source = FrameSource::new(p.camera, settings(TransferMode::Dma, None));
        source.power_on().unwrap();
        source.configure().unwrap();

        source.start_capture();
        assert!(source.poll().is_none());
        assert!(!source.is_frame_ready());

        let ready = source.wait_ready(&p.platform);
        assert_eq!(ready.sequence(), 1);
        assert!(source.is_frame_ready(), "readiness is repeatable");

        let frame = source.read_frame(ready);
        assert_eq!((frame.width(), frame.height()), (4, 4));
        assert!(handles.trace.snapshot().contains(&TraceEvent::CaptureStarted));
    }

    #[test]
    fn test_prescaler_written_after_setup() {
        let (p, _) = SimBoard::build(SimConfig::default());
        let mut source = FrameSource::new(p.camera, settings(TransferMode::Streaming, Some(1)));
        source.power_on().unwrap();
        source.configure().unwrap();
        assert_eq!(source.camera().register(CLOCK_PRESCALER_REGISTER), Some(1));
    }

    #[test]
    fn test_setup_rejection_is_sensor_setup_error() {
        let config = SimConfig {
            camera: CameraBehavior {
                fail_setup: true,
                ..CameraBehavior::default()
            },
            ..SimConfig::default()
        };
        let (p, _) = SimBoard::build(config);
        let mut source = FrameSource::new(p.camera, settings(TransferMode::Dma, None));
        source.power_on().unwrap();
        assert!(matches!(source.configure(), Err(NodeError::SensorSetup(_))));
    }

    #[test]
    fn test_configure_without_power_fails() {
        let (p, _) = SimBoard::build(SimConfig::default());
        let mut source = FrameSource::new(p.camera, settings(TransferMode::Dma, None));
        assert!(matches!(source.configure(), Err(NodeError::SensorSetup(_))));
    }

    #[test]
    fn test_streaming_overflow_detected() {
        let config = SimConfig {
            camera: CameraBehavior {
                overflow_on_capture: Some(1),
                ..CameraBehavior::default()
            },
            ..SimConfig::default()
        };
        let (p, _) = SimBoard::build(config);
        let mut source = FrameSource::new(p.camera, settings(TransferMode::Streaming, None));
        source.power_on().unwrap();
        source.configure().unwrap();
        source.start_capture();
        assert!(matches!(
            source.check_overflow(),
            Err(NodeError::StreamingOverflow { count: 1 })
        ));
    }
}
