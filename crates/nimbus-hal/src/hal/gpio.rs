// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// GPIO abstraction for output lines (radio reset, fault indicator)
pub trait GpioProvider {
    /// Platform-specific pin type (must be Copy for ease of use)
    type Pin: Copy + core::fmt::Debug;

    /// Platform-specific error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Drive pin high
    fn set_high(&mut self, pin: Self::Pin) -> Result<(), Self::Error>;

    /// Drive pin low
    fn set_low(&mut self, pin: Self::Pin) -> Result<(), Self::Error>;

    /// Read back pin state
    fn is_high(&self, pin: Self::Pin) -> Result<bool, Self::Error>;

    /// Read pin state (inverted)
    fn is_low(&self, pin: Self::Pin) -> Result<bool, Self::Error> {
        Ok(!self.is_high(pin)?)
    }

    /// Toggle pin state
    fn toggle(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        if self.is_high(pin)? {
            self.set_low(pin)
        } else {
            self.set_high(pin)
        }
    }
}
