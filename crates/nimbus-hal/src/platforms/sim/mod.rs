// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulated board
//!
//! Every device of the real node, backed by host threads:
//! - the accelerator completes on a worker thread and raises a latched
//!   interrupt line, so `wait_for_interrupt` behaves like WFI
//! - the wake pin is a counting edge latch fed by tests or a timer thread
//! - everything observable is appended to a shared [`TraceRecorder`]
//!
//! ```
//! use nimbus_hal::sim::{SimBoard, SimConfig};
//!
//! let (peripherals, handles) = SimBoard::build(SimConfig::default());
//! handles.wake.fire();
//! assert!(handles.trace.snapshot().is_empty());
//! # drop(peripherals);
//! ```

mod accelerator;
mod camera;
mod clock;
mod gpio;
mod interrupt;
mod radio;
mod serial;
mod trace;

use std::sync::Arc;
use std::time::Duration;

use nimbus_neural::{InputGeometry, InputVariant};
use parking_lot::Mutex;
use thiserror::Error;

pub use accelerator::{ScoreFn, SimAccelerator, SimModel};
pub use camera::{CameraBehavior, SimCamera};
pub use clock::{SimClock, SimPlatform};
pub use gpio::{PinMonitor, SimGpio, SimPin};
pub use interrupt::{InterruptLine, WakeLine, WakeTrigger};
pub use radio::{RadioLog, RadioMonitor, SimRadio};
pub use serial::{SerialCapture, SimSerial};
pub use trace::{TraceEvent, TraceRecorder};

use crate::hal::{Board, BoardPins, Peripherals};

/// Errors raised by simulated devices
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{device} setup rejected: {reason}")]
    SetupRejected { device: &'static str, reason: String },

    #[error("{0} used before initialisation")]
    NotInitialized(&'static str),

    #[error("{0} is powered down")]
    PoweredDown(&'static str),

    #[error("console write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Simulated board configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Sleep for real on delays; otherwise delays only advance the clock
    pub realtime: bool,
    pub camera: CameraBehavior,
    /// RGB888 source frames, cycled in order
    pub frames: Vec<Vec<u8>>,
    pub model: SimModel,
    pub inference_latency: Duration,
    /// Status polls before the radio reports TX-done; `None` never acks
    pub radio_ack_after_polls: Option<u32>,
    /// Mirror the console to stdout
    pub echo_serial: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        let geometry = InputGeometry::new(32, 32, InputVariant::Luma);
        Self {
            realtime: false,
            camera: CameraBehavior {
                capture_latency_us: 2_000,
                ..CameraBehavior::default()
            },
            frames: Vec::new(),
            model: SimModel::brightness(geometry, 4),
            inference_latency: Duration::from_millis(2),
            radio_ack_after_polls: Some(2),
            echo_serial: false,
        }
    }
}

/// Marker type binding the simulated drivers together
pub struct SimBoard;

impl Board for SimBoard {
    type Camera = SimCamera;
    type Accelerator = SimAccelerator;
    type Radio = SimRadio;
    type Gpio = SimGpio;
    type Serial = SimSerial;
    type Platform = SimPlatform;
}

/// Observation and stimulus handles kept by the caller
#[derive(Debug, Clone)]
pub struct SimHandles {
    pub trace: TraceRecorder,
    pub serial: SerialCapture,
    pub wake: WakeTrigger,
    pub pins: PinMonitor,
    pub radio: RadioMonitor,
}

impl SimBoard {
    /// Wire up a fresh board
    pub fn build(config: SimConfig) -> (Peripherals<SimBoard>, SimHandles) {
        let trace = TraceRecorder::new();
        let clock = Arc::new(SimClock::new(config.realtime));
        let irq = Arc::new(InterruptLine::new());
        let wake = Arc::new(WakeLine::new());
        let pins = Arc::new(Mutex::new([false; 2]));
        let console = Arc::new(Mutex::new(Vec::new()));
        let radio_log = Arc::new(Mutex::new(RadioLog::default()));

        let peripherals = Peripherals {
            camera: SimCamera::new(
                Arc::clone(&clock),
                trace.clone(),
                config.camera,
                config.frames,
            ),
            accelerator: SimAccelerator::new(
                config.model,
                config.inference_latency,
                trace.clone(),
                irq.clone(),
            ),
            radio: SimRadio::new(
                Arc::clone(&pins),
                trace.clone(),
                Arc::clone(&radio_log),
                config.radio_ack_after_polls,
            ),
            gpio: SimGpio::new(Arc::clone(&pins), trace.clone()),
            serial: SimSerial::new(Arc::clone(&console), config.echo_serial),
            platform: SimPlatform::new(clock, irq, Arc::clone(&wake), trace.clone()),
            pins: BoardPins {
                radio_reset: SimPin::RadioReset,
                fault_led: SimPin::FaultLed,
            },
        };

        let handles = SimHandles {
            trace,
            serial: SerialCapture::new(console),
            wake: WakeTrigger::new(wake),
            pins: PinMonitor::new(pins),
            radio: RadioMonitor::new(radio_log),
        };

        (peripherals, handles)
    }
}
