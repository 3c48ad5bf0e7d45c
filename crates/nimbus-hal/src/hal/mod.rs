// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware Abstraction Layer (HAL) trait definitions for the sensing node
//!
//! This module defines platform-agnostic traits that must be implemented
//! by each board to provide:
//! - Time management (TimeProvider)
//! - Low-power waits (PowerManager)
//! - Image capture (CameraSensor)
//! - Inference (CnnAccelerator)
//! - Radio (LoraRadio)
//! - GPIO control (GpioProvider)
//! - Diagnostic console (SerialIO)

/// CNN accelerator control traits.
pub mod accelerator;
/// Image sensor traits and capture configuration.
pub mod camera;
/// General-purpose I/O abstractions for pins.
pub mod gpio;
/// Low-power waits (WFI, wake-line sleep).
pub mod power;
/// LoRa transceiver traits and transmit parameters.
pub mod radio;
/// Serial output for the diagnostic console.
pub mod serial;
/// Timekeeping abstractions (monotonic timers, delays).
pub mod time;

// Re-export trait types
pub use accelerator::{AcceleratorClock, CnnAccelerator, CompletionHandler};
pub use camera::{CameraSensor, CaptureConfig, PixelFormat, TransferMode};
pub use gpio::GpioProvider;
pub use power::PowerManager;
pub use radio::{Bandwidth, CodingRate, LoraRadio, PacketLength, RadioStatus, TxParams};
pub use serial::SerialIO;
pub use time::TimeProvider;

/// Core platform services: time, low-power waits and the final halt
pub trait Platform: TimeProvider + PowerManager {
    /// Get platform name (e.g., "MAX78000", "sim")
    fn name(&self) -> &'static str;

    /// Get CPU frequency in Hz
    fn cpu_frequency_hz(&self) -> u32;

    /// Get platform uptime in milliseconds
    fn uptime_ms(&self) -> u64 {
        self.get_time_us() / 1000
    }

    /// Stop forever. Interrupts stay masked; only a power cycle recovers.
    fn halt(&self) -> !;
}

/// A concrete board: one driver type per device
pub trait Board {
    type Camera: CameraSensor;
    type Accelerator: CnnAccelerator;
    type Radio: LoraRadio;
    type Gpio: GpioProvider;
    type Serial: SerialIO;
    type Platform: Platform;
}

/// Output lines the node drives directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPins<P> {
    /// Radio reset/enable line, asserted high while the radio is in use
    pub radio_reset: P,
    /// Error indicator LED
    pub fault_led: P,
}

/// Every driver of a [`Board`], handed to the node once at startup
pub struct Peripherals<B: Board> {
    pub camera: B::Camera,
    pub accelerator: B::Accelerator,
    pub radio: B::Radio,
    pub gpio: B::Gpio,
    pub serial: B::Serial,
    pub platform: B::Platform,
    pub pins: BoardPins<<B::Gpio as GpioProvider>::Pin>,
}
