// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Nimbus HAL
//!
//! Device traits for the sensing node plus board implementations.
//!
//! This crate provides:
//! - **HAL traits** (`hal` module) - Platform-agnostic hardware abstractions
//! - **Platform implementations** (`platforms` module) - Concrete boards
//!
//! ## Feature Flags
//!
//! - `sim` (default) - host-side simulated board used by the node binary
//!   and by the end-to-end tests

/// Hardware abstraction traits shared by all boards.
pub mod hal;

/// Concrete board implementations.
pub mod platforms;

// Re-export commonly used types
pub use hal::{
    AcceleratorClock, Bandwidth, Board, BoardPins, CameraSensor, CaptureConfig, CnnAccelerator,
    CodingRate, CompletionHandler, GpioProvider, LoraRadio, PacketLength, Peripherals,
    PixelFormat, Platform, PowerManager, RadioStatus, SerialIO, TimeProvider, TransferMode,
    TxParams,
};

#[cfg(feature = "sim")]
pub use platforms::sim;

/// Prelude module for convenient imports
///
/// ```
/// use nimbus_hal::prelude::*;
/// ```
pub mod prelude {
    pub use crate::hal::*;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
