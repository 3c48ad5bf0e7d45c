// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use nimbus_neural::Frame;

/// Sensor pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8 bits per channel, R, G, B
    Rgb888,
}

impl PixelFormat {
    /// Bytes per pixel in the capture buffer for a given transfer mode
    pub fn bytes_per_pixel(self, mode: TransferMode) -> u8 {
        match (self, mode) {
            (PixelFormat::Rgb888, TransferMode::Dma) => 3,
            // Streaming delivers one 0x00bbggrr word per pixel
            (PixelFormat::Rgb888, TransferMode::Streaming) => 4,
        }
    }
}

/// How pixels move from the sensor into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferMode {
    /// Whole frame transferred by DMA into one buffer
    Dma,
    /// Line-by-line streaming; the driver counts buffer overflows
    Streaming,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Dma => f.write_str("dma"),
            TransferMode::Streaming => f.write_str("streaming"),
        }
    }
}

/// Sensor setup parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub transfer_mode: TransferMode,
    pub dma_channel: u8,
}

impl CaptureConfig {
    pub fn bytes_per_pixel(&self) -> u8 {
        self.pixel_format.bytes_per_pixel(self.transfer_mode)
    }

    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * usize::from(self.bytes_per_pixel())
    }
}

/// Image sensor driver
pub trait CameraSensor {
    /// Platform-specific error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Bring up the sensor interface at `clock_hz`
    fn init(&mut self, clock_hz: u32) -> Result<(), Self::Error>;

    /// Configure resolution, format and transfer path
    fn setup(&mut self, config: &CaptureConfig) -> Result<(), Self::Error>;

    /// Raw sensor register write
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;

    /// Soft-reset the sensor; setup must be repeated afterwards
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Switch sensor power. Idempotent.
    fn set_power(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Begin capturing one frame. Returns immediately.
    fn start_capture(&mut self);

    /// True once the frame started by [`CameraSensor::start_capture`] is
    /// complete. No side effects.
    fn is_ready(&self) -> bool;

    /// The most recently completed frame
    fn image(&self) -> Frame<'_>;

    /// Overflow events seen by the streaming path since the last capture
    /// started. Always zero in DMA mode.
    fn overflow_count(&self) -> u32;
}
