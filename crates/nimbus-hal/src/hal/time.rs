// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Monotonic time and blocking delays
pub trait TimeProvider {
    /// Microseconds since boot
    fn get_time_us(&self) -> u64;

    /// Busy or sleeping delay for `us` microseconds
    fn delay_us(&self, us: u32);

    /// Block for the specified number of milliseconds
    fn delay_ms(&self, ms: u32) {
        self.delay_us(ms.saturating_mul(1000));
    }
}
